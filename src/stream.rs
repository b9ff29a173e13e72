//! Streaming execution: results surface one by one instead of at the end.
//!
//! The stream is lazily sequential — polling drives exactly one in-flight
//! item, and the next item does not start until the previous yields. Every
//! item produces exactly one `(index, result)` pair in input order, and
//! failures are always folded into [`ResultItem::Error`] so a consumer can
//! render progress without aborting; callers wanting abort-on-first-failure
//! use [`crate::execute::execute_batch`].

use crate::config::ClientConfig;
use crate::execute::{execute_item, Transport};
use crate::item::{InputItem, ResultItem};
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

/// Ordered per-item results, indexed by input position.
pub type ResultStream = Pin<Box<dyn Stream<Item = (usize, ResultItem)> + Send>>;

/// Execute the batch as a stream of per-item results.
pub fn execute_stream<T>(
    transport: T,
    config: ClientConfig,
    items: Vec<InputItem>,
) -> ResultStream
where
    T: Transport + Send + Sync + 'static,
{
    let transport = Arc::new(transport);
    let config = Arc::new(config);

    Box::pin(
        stream::iter(items.into_iter().enumerate()).then(move |(index, item)| {
            let transport = Arc::clone(&transport);
            let config = Arc::clone(&config);
            async move {
                let result = match execute_item(transport.as_ref(), &config, &item).await {
                    Ok(response) => ResultItem::Success(response),
                    Err(error) => ResultItem::from_error(&error),
                };
                (index, result)
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItemError;
    use crate::request::RequestSpec;
    use futures::StreamExt;
    use serde_json::{json, Value};

    struct CountingTransport;

    impl Transport for CountingTransport {
        async fn send(
            &self,
            _config: &ClientConfig,
            spec: &RequestSpec,
        ) -> Result<Value, ItemError> {
            Ok(json!({ "path": spec.path }))
        }
    }

    fn url_item(resource: &str, operation: &str) -> InputItem {
        InputItem::new(
            json!({
                "resource": resource,
                "operation": operation,
                "documentInputSource": "url",
                "documentUrl": "https://example.com/doc.png",
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn yields_results_in_input_order() {
        let items = vec![
            url_item("document", "recognizeDocument"),
            url_item("document", "recognizeDocumentAsync"),
        ];
        let pairs: Vec<_> = execute_stream(CountingTransport, ClientConfig::default(), items)
            .collect()
            .await;

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, 0);
        assert_eq!(pairs[0].1.to_json()["path"], json!("/scan"));
        assert_eq!(pairs[1].0, 1);
        assert_eq!(pairs[1].1.to_json()["path"], json!("/scan/async"));
    }

    #[tokio::test]
    async fn failures_become_error_items_and_do_not_stop_the_stream() {
        let items = vec![
            InputItem::new(
                json!({ "resource": "result", "operation": "getResultByUuid", "resultUuid": "" })
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
            url_item("document", "recognizeDocument"),
        ];
        let pairs: Vec<_> = execute_stream(CountingTransport, ClientConfig::default(), items)
            .collect()
            .await;

        assert_eq!(pairs.len(), 2);
        assert!(!pairs[0].1.is_success());
        assert_eq!(
            pairs[0].1.to_json(),
            json!({ "error": "Result UUID is required." })
        );
        assert!(pairs[1].1.is_success());
    }

    #[tokio::test]
    async fn empty_batch_yields_nothing() {
        let pairs: Vec<_> = execute_stream(CountingTransport, ClientConfig::default(), vec![])
            .collect()
            .await;
        assert!(pairs.is_empty());
    }
}
