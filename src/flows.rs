//! Flow discovery helpers.
//!
//! These back interactive pickers: list the flows the account can upload to,
//! optionally narrowed by a case-insensitive search term. Unlike the
//! dispatch operations they always request a restricted access-level set, so
//! the listing only contains flows the credential can actually feed.

use crate::config::ClientConfig;
use crate::dispatch::builders::FLOW_ACCESS_LEVELS;
use crate::error::ItemError;
use crate::execute::Transport;
use crate::request::RequestSpec;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One selectable flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDescriptor {
    #[serde(rename = "flowID")]
    pub flow_id: String,
    /// Display name; falls back to the ID when the server omits it.
    pub name: String,
}

/// Fetch all flows visible to the credential as owner, administrator, or
/// uploader.
///
/// Entries without a string `flowID` are dropped rather than surfaced as
/// errors — the server occasionally includes placeholder rows the picker
/// cannot use.
pub async fn list_flows<T: Transport>(
    transport: &T,
    config: &ClientConfig,
) -> Result<Vec<FlowDescriptor>, ItemError> {
    let spec = RequestSpec::new(Method::GET, "/flow")
        .with_query("accessLevel", FLOW_ACCESS_LEVELS);
    let response = transport.send(config, &spec).await?;

    let entries = match response {
        Value::Array(entries) => entries,
        other => {
            return Err(ItemError::Provider {
                status: None,
                message: format!(
                    "flow listing was not an array (got {})",
                    json_kind(&other)
                ),
            });
        }
    };

    let mut flows = Vec::with_capacity(entries.len());
    for entry in &entries {
        let Some(flow_id) = entry.get("flowID").and_then(Value::as_str) else {
            continue;
        };
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(flow_id);
        flows.push(FlowDescriptor {
            flow_id: flow_id.to_string(),
            name: name.to_string(),
        });
    }
    debug!("Listed {} usable flows ({} raw entries)", flows.len(), entries.len());

    Ok(flows)
}

/// List flows whose name or ID contains `filter`, case-insensitively.
///
/// An empty or whitespace-only filter returns the full listing.
pub async fn search_flows<T: Transport>(
    transport: &T,
    config: &ClientConfig,
    filter: &str,
) -> Result<Vec<FlowDescriptor>, ItemError> {
    let mut flows = list_flows(transport, config).await?;

    let needle = filter.trim().to_lowercase();
    if !needle.is_empty() {
        flows.retain(|flow| {
            flow.name.to_lowercase().contains(&needle)
                || flow.flow_id.to_lowercase().contains(&needle)
        });
    }

    Ok(flows)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItemError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Stub that records the request it receives.
    struct RecordingTransport {
        response: Value,
        seen: Mutex<Option<RequestSpec>>,
    }

    impl RecordingTransport {
        fn new(response: Value) -> Self {
            Self {
                response,
                seen: Mutex::new(None),
            }
        }
    }

    impl Transport for RecordingTransport {
        async fn send(
            &self,
            _config: &ClientConfig,
            spec: &RequestSpec,
        ) -> Result<Value, ItemError> {
            *self.seen.lock().unwrap() = Some(spec.clone());
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn requests_restricted_access_levels() {
        let transport = RecordingTransport::new(json!([]));
        let config = ClientConfig::default();

        list_flows(&transport, &config).await.unwrap();

        let spec = transport.seen.lock().unwrap().clone().unwrap();
        assert_eq!(spec.path, "/flow");
        assert_eq!(
            spec.query_value("accessLevel"),
            Some("owner,administrator,uploader")
        );
    }

    #[tokio::test]
    async fn drops_entries_without_flow_id_and_backfills_names() {
        let transport = RecordingTransport::new(json!([
            { "flowID": "f-1", "name": "Invoices" },
            { "flowID": "f-2" },
            { "flowID": "f-3", "name": "   " },
            { "name": "no id at all" },
            { "flowID": 42 },
        ]));
        let config = ClientConfig::default();

        let flows = list_flows(&transport, &config).await.unwrap();
        assert_eq!(
            flows,
            vec![
                FlowDescriptor { flow_id: "f-1".into(), name: "Invoices".into() },
                FlowDescriptor { flow_id: "f-2".into(), name: "f-2".into() },
                FlowDescriptor { flow_id: "f-3".into(), name: "f-3".into() },
            ]
        );
    }

    #[tokio::test]
    async fn search_matches_name_or_id_case_insensitively() {
        let transport = RecordingTransport::new(json!([
            { "flowID": "inv-2024", "name": "Invoices" },
            { "flowID": "rcpt-1", "name": "Receipts" },
            { "flowID": "misc-INV", "name": "Everything else" },
        ]));
        let config = ClientConfig::default();

        let flows = search_flows(&transport, &config, "  INV  ").await.unwrap();
        let ids: Vec<&str> = flows.iter().map(|f| f.flow_id.as_str()).collect();
        assert_eq!(ids, vec!["inv-2024", "misc-INV"]);
    }

    #[tokio::test]
    async fn empty_filter_returns_everything() {
        let transport = RecordingTransport::new(json!([
            { "flowID": "a" },
            { "flowID": "b" },
        ]));
        let config = ClientConfig::default();

        let flows = search_flows(&transport, &config, "   ").await.unwrap();
        assert_eq!(flows.len(), 2);
    }

    #[tokio::test]
    async fn non_array_listing_is_a_provider_error() {
        let transport = RecordingTransport::new(json!({ "message": "nope" }));
        let config = ClientConfig::default();

        let err = list_flows(&transport, &config).await.unwrap_err();
        assert!(err.to_string().contains("not an array"));
    }
}
