//! Resource/operation resolution.
//!
//! The host workflow supplies `resource` and `operation` as free strings, so
//! the registry keeps a runtime resolution step — but once resolved, the
//! pair becomes a tagged [`Operation`] variant and every downstream match is
//! exhaustive at compile time. Adding an operation without handling it in
//! the builders is a compile error, not a runtime "unsupported" branch.

use crate::error::ItemError;
use crate::item::InputItem;
use serde::Serialize;

/// The API surface a request targets.
///
/// `Scan` and `Async` are the legacy v1 names for what v2 calls `Document`;
/// they resolve to the same builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resource {
    Document,
    Scan,
    Async,
    Signature,
    Face,
    Flow,
    Result,
}

impl Resource {
    /// The wire-level name the host uses for this resource.
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Document => "document",
            Resource::Scan => "scan",
            Resource::Async => "async",
            Resource::Signature => "signature",
            Resource::Face => "face",
            Resource::Flow => "flow",
            Resource::Result => "result",
        }
    }
}

/// Every operation the dispatcher can build a request for.
///
/// One variant per distinct request shape; legacy aliases collapse onto the
/// canonical variant during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operation {
    RecognizeDocument,
    RecognizeDocumentAsync,
    GetAsyncScanResult,
    RecognizeSignature,
    VerifySignature,
    RecognizeFace,
    VerifyFace,
    ListFlows,
    GetFlowResults,
    GetResultByUuid,
}

/// The resolved dispatch key: which builder runs for this item.
///
/// Constructed once per item and used only as a lookup key. The original
/// `resource` is retained so errors and logs echo what the user selected,
/// even for legacy aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationKey {
    pub resource: Resource,
    pub operation: Operation,
}

impl OperationKey {
    /// Resolve a `resource`/`operation` string pair.
    ///
    /// Unknown pairs produce [`ItemError::UnsupportedOperation`] naming both
    /// halves — a per-item failure, never a batch abort on its own.
    pub fn resolve(resource: &str, operation: &str) -> Result<Self, ItemError> {
        use Operation::*;
        use Resource::*;

        let key = match (resource, operation) {
            ("document", "recognizeDocument") => (Document, RecognizeDocument),
            ("document", "recognizeDocumentAsync") => (Document, RecognizeDocumentAsync),
            ("document", "getAsyncScanResult") => (Document, GetAsyncScanResult),
            // Legacy v1 naming: the `scan` and `async` resources.
            ("scan", "scanDocument") => (Scan, RecognizeDocument),
            ("async", "createAsyncScan") => (Async, RecognizeDocumentAsync),
            ("async", "getAsyncScanResult") => (Async, GetAsyncScanResult),
            ("signature", "recognizeSignature") => (Signature, RecognizeSignature),
            ("signature", "verifySignature") => (Signature, VerifySignature),
            ("face", "recognizeFace") => (Face, RecognizeFace),
            ("face", "verifyFace") => (Face, VerifyFace),
            ("flow", "listFlows") => (Flow, ListFlows),
            ("result", "getFlowResults") => (Result, GetFlowResults),
            ("result", "getResultByUuid") => (Result, GetResultByUuid),
            _ => {
                return Err(ItemError::UnsupportedOperation {
                    resource: resource.to_string(),
                    operation: operation.to_string(),
                })
            }
        };

        Ok(OperationKey {
            resource: key.0,
            operation: key.1,
        })
    }

    /// Resolve the key from an item's own `resource`/`operation` parameters.
    pub fn from_item(item: &InputItem) -> Result<Self, ItemError> {
        let resource = item
            .trimmed_param("resource")
            .ok_or_else(|| ItemError::validation("Resource is required."))?;
        let operation = item
            .trimmed_param("operation")
            .ok_or_else(|| ItemError::validation("Operation is required."))?;
        Self::resolve(resource, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Every pair the host UI exposes must resolve to a builder.
    #[test]
    fn registry_covers_all_exposed_pairs() {
        let exposed = [
            ("document", "recognizeDocument"),
            ("document", "recognizeDocumentAsync"),
            ("document", "getAsyncScanResult"),
            ("scan", "scanDocument"),
            ("async", "createAsyncScan"),
            ("async", "getAsyncScanResult"),
            ("signature", "recognizeSignature"),
            ("signature", "verifySignature"),
            ("face", "recognizeFace"),
            ("face", "verifyFace"),
            ("flow", "listFlows"),
            ("result", "getFlowResults"),
            ("result", "getResultByUuid"),
        ];
        for (resource, operation) in exposed {
            assert!(
                OperationKey::resolve(resource, operation).is_ok(),
                "no builder for {resource}:{operation}"
            );
        }
    }

    #[test]
    fn legacy_aliases_collapse_to_canonical_operations() {
        let legacy = OperationKey::resolve("scan", "scanDocument").unwrap();
        assert_eq!(legacy.operation, Operation::RecognizeDocument);
        assert_eq!(legacy.resource, Resource::Scan);

        let current = OperationKey::resolve("document", "recognizeDocument").unwrap();
        assert_eq!(current.operation, legacy.operation);
    }

    #[test]
    fn unknown_pair_is_unsupported() {
        let err = OperationKey::resolve("face", "listFlows").unwrap_err();
        match err {
            ItemError::UnsupportedOperation {
                resource,
                operation,
            } => {
                assert_eq!(resource, "face");
                assert_eq!(operation, "listFlows");
            }
            other => panic!("expected UnsupportedOperation, got {other:?}"),
        }
    }

    #[test]
    fn from_item_requires_both_params() {
        let item = InputItem::new(
            json!({ "resource": "flow" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        let err = OperationKey::from_item(&item).unwrap_err();
        assert!(err.to_string().contains("Operation is required."));
    }
}
