//! Error types for the base64ai-client library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ItemError`] — **Non-fatal**: one input item of the batch failed
//!   (missing parameter, missing binary property, unsupported operation,
//!   provider rejection). Under [`crate::config::ExecutionPolicy::ContinueOnFailure`]
//!   it becomes the item's `{"error": …}` envelope and the batch moves on.
//!
//! * [`BatchError`] — **Fatal**: the whole batch cannot proceed (invalid
//!   configuration, or an item failed while the abort policy is active).
//!   Returned as `Err(BatchError)` from [`crate::execute::execute_batch`].
//!
//! The separation lets callers decide their own tolerance: abort on the
//! first bad item, or collect error envelopes alongside successes.

use thiserror::Error;

/// A non-fatal error scoped to a single input item.
///
/// All variants surface during the Build or Send phase of exactly one item
/// and never poison the rest of the batch on their own.
#[derive(Debug, Clone, Error)]
pub enum ItemError {
    /// A required parameter is absent, empty after trimming, or malformed.
    #[error("{message}")]
    Validation { message: String },

    /// The named binary property does not exist on the input item.
    #[error("Binary property \"{property}\" is missing from input item.")]
    MissingBinary { property: String },

    /// No builder is registered for the resolved resource/operation pair.
    #[error("The combination of resource \"{resource}\" and operation \"{operation}\" is not supported.")]
    UnsupportedOperation { resource: String, operation: String },

    /// The provider returned a non-2xx status, or the transport failed.
    ///
    /// `status` is `None` for connection-level failures that never produced
    /// an HTTP response.
    #[error("Base64.ai request failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Provider { status: Option<u16>, message: String },
}

impl ItemError {
    /// Shorthand for an [`ItemError::Validation`] with a preformatted message.
    pub fn validation(message: impl Into<String>) -> Self {
        ItemError::Validation {
            message: message.into(),
        }
    }
}

/// All fatal errors returned by the batch-level entry points.
///
/// Item-scoped failures use [`ItemError`] and only escalate here when the
/// abort policy is active.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Credentials could not be resolved (missing email or API key).
    #[error("Base64.ai credentials are not configured.\n{hint}")]
    CredentialsMissing { hint: String },

    /// An item failed while `ExecutionPolicy::Abort` was active.
    ///
    /// `index` is the zero-based position of the failing item in the batch.
    #[error("Item {index} failed: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: ItemError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_names_property() {
        let e = ItemError::MissingBinary {
            property: "data".into(),
        };
        assert!(e.to_string().contains("\"data\""), "got: {e}");
    }

    #[test]
    fn unsupported_operation_names_both_halves() {
        let e = ItemError::UnsupportedOperation {
            resource: "face".into(),
            operation: "listFlows".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("\"face\""));
        assert!(msg.contains("\"listFlows\""));
    }

    #[test]
    fn provider_display_with_status() {
        let e = ItemError::Provider {
            status: Some(429),
            message: "too many requests".into(),
        };
        assert!(e.to_string().contains("HTTP 429"));
    }

    #[test]
    fn provider_display_without_status() {
        let e = ItemError::Provider {
            status: None,
            message: "connection reset".into(),
        };
        assert!(!e.to_string().contains("HTTP"));
        assert!(e.to_string().contains("connection reset"));
    }

    #[test]
    fn item_failed_carries_index() {
        let e = BatchError::ItemFailed {
            index: 3,
            source: ItemError::validation("Result UUID is required."),
        };
        assert!(e.to_string().contains("Item 3"));
        assert!(e.to_string().contains("Result UUID is required."));
    }
}
