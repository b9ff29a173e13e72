//! The item-loop executor and the HTTP transport behind it.
//!
//! ## Why strictly sequential?
//!
//! Execution proceeds one item at a time: item *i+1* never starts before
//! item *i* completes. All data is item-local, so there is no shared mutable
//! state to guard, and error attribution stays trivial — an error's item
//! index is just the loop counter. Per-item flow is
//! `Resolve → Build → Send → (Simplify) → Collect`, with every failure
//! caught uniformly at the item boundary and handled according to the
//! configured [`ExecutionPolicy`].
//!
//! The [`Transport`] trait is the seam between the dispatcher and the wire:
//! the library ships [`HttpTransport`] (reqwest), tests substitute a stub
//! returning canned JSON. Retry, backoff, and caching are deliberately
//! absent — the transport issues exactly one attempt per request.

use crate::config::{ClientConfig, ExecutionPolicy};
use crate::credentials::Credentials;
use crate::dispatch::{builders, key::OperationKey};
use crate::error::{BatchError, ItemError};
use crate::item::{InputItem, ResultItem};
use crate::request::RequestSpec;
use crate::simplify;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum provider error-body length echoed into an [`ItemError`].
const ERROR_BODY_LIMIT: usize = 512;

/// Exchanges one [`RequestSpec`] for the provider's JSON response.
///
/// Implementations own authentication and the network; everything above
/// this trait is pure data transformation.
pub trait Transport {
    fn send(
        &self,
        config: &ClientConfig,
        spec: &RequestSpec,
    ) -> impl Future<Output = Result<Value, ItemError>> + Send;
}

/// The reqwest-backed transport used outside of tests.
///
/// Cloning is cheap: `reqwest::Client` is internally reference-counted.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    credentials: Credentials,
}

impl HttpTransport {
    /// Create a transport authenticating as the given account.
    pub fn new(credentials: Credentials) -> Result<Self, BatchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| BatchError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            credentials,
        })
    }

    /// Verify the credential pair with `GET /auth/user`.
    ///
    /// A 2xx response means the email/key pair is valid for this endpoint.
    pub async fn verify_credentials(&self, config: &ClientConfig) -> Result<Value, ItemError> {
        self.send(config, &Credentials::verification_request())
            .await
    }
}

impl Transport for HttpTransport {
    async fn send(&self, config: &ClientConfig, spec: &RequestSpec) -> Result<Value, ItemError> {
        let url = format!("{}{}", config.effective_base_url(), spec.path);
        debug!("{} {}", spec.method, url);

        let mut request = self
            .client
            .request(spec.method.clone(), &url)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .header("Authorization", self.credentials.authorization_header());

        for (name, value) in &spec.headers {
            request = request.header(name, value);
        }
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(ref body) = spec.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ItemError::Provider {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > ERROR_BODY_LIMIT {
                let cut = (0..=ERROR_BODY_LIMIT)
                    .rev()
                    .find(|&i| message.is_char_boundary(i))
                    .unwrap_or(0);
                message.truncate(cut);
                message.push('…');
            }
            if message.is_empty() {
                message = status.to_string();
            }
            return Err(ItemError::Provider {
                status: Some(status.as_u16()),
                message,
            });
        }

        response.json::<Value>().await.map_err(|e| ItemError::Provider {
            status: Some(status.as_u16()),
            message: format!("response was not valid JSON: {e}"),
        })
    }
}

// ── Batch execution ──────────────────────────────────────────────────────

/// Wall-clock accounting for one batch invocation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStats {
    pub total_items: usize,
    pub succeeded_items: usize,
    pub failed_items: usize,
    pub total_duration_ms: u64,
}

/// Everything a completed batch produced.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// One result per input item, in input order.
    pub results: Vec<ResultItem>,
    pub stats: BatchStats,
}

/// Run one item end to end: resolve, build, send, optionally simplify.
///
/// This is the single-item core shared by [`execute_batch`] and
/// [`crate::stream::execute_stream`]. Validation and unsupported-operation
/// errors surface before any network call; provider errors only after.
pub async fn execute_item<T: Transport>(
    transport: &T,
    config: &ClientConfig,
    item: &InputItem,
) -> Result<Value, ItemError> {
    let profile = config.profile();
    let key = OperationKey::from_item(item)?;
    let spec = builders::build_request(&key, &profile, item)?;
    debug!(
        "Dispatching {}:{:?} → {} {}",
        key.resource.as_str(),
        key.operation,
        spec.method,
        spec.path
    );

    let response = transport.send(config, &spec).await?;

    if simplify::should_simplify(&profile, key.operation, item) {
        Ok(simplify::simplify_response(key.operation, &response))
    } else {
        Ok(response)
    }
}

/// Execute a batch of items sequentially.
///
/// Under [`ExecutionPolicy::ContinueOnFailure`] each failing item is
/// collected as an `{"error": …}` result and the loop proceeds. Under
/// [`ExecutionPolicy::Abort`] the first failure returns
/// [`BatchError::ItemFailed`] with the zero-based item index; returning
/// `Err` is the batch being treated as failed, so partial results are not
/// carried along — callers who want them use the continue policy or the
/// streaming API.
pub async fn execute_batch<T: Transport>(
    transport: &T,
    config: &ClientConfig,
    items: &[InputItem],
) -> Result<BatchOutput, BatchError> {
    let start = Instant::now();
    info!(
        "Dispatching batch of {} items ({:?}, {:?})",
        items.len(),
        config.schema_version,
        config.policy
    );

    let mut results = Vec::with_capacity(items.len());
    let mut failed = 0usize;

    for (index, item) in items.iter().enumerate() {
        match execute_item(transport, config, item).await {
            Ok(response) => results.push(ResultItem::Success(response)),
            Err(error) => match config.policy {
                ExecutionPolicy::ContinueOnFailure => {
                    warn!("Item {index} failed, continuing: {error}");
                    failed += 1;
                    results.push(ResultItem::from_error(&error));
                }
                ExecutionPolicy::Abort => {
                    return Err(BatchError::ItemFailed {
                        index,
                        source: error,
                    });
                }
            },
        }
    }

    let stats = BatchStats {
        total_items: items.len(),
        succeeded_items: items.len() - failed,
        failed_items: failed,
        total_duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Batch complete: {}/{} items succeeded in {}ms",
        stats.succeeded_items, stats.total_items, stats.total_duration_ms
    );

    Ok(BatchOutput { results, stats })
}
