//! Response simplification: flatten verbose provider responses.
//!
//! ## Why best-effort?
//!
//! Simplification is a convenience projection layered on top of the primary
//! response — it must never be the reason a response is lost or corrupted.
//! Every function here is total over `serde_json::Value`: known shapes are
//! flattened, anything unknown or malformed passes through unchanged. No
//! function in this module can fail.
//!
//! Four projections exist, selected by the resolved operation:
//!
//! 1. **Scan results** — per-entry identity, model classification (with
//!    legacy fallback field names), extracted fields, page count, and
//!    feature counts derived from array lengths
//! 2. **Async-wrapped scan results** — preserves the job `status` next to a
//!    recursively simplified result list
//! 3. **Flow-result listing** — ordering metadata plus reduced per-entry
//!    records
//! 4. **Single result by UUID** — un-nests the one-element `result` array,
//!    preferring top-level fields and falling back to nested ones
//!
//! JSON `null` is treated as absent throughout, matching the `??` fallback
//! chains of the original projections; keys with no resolved value are
//! omitted rather than emitted as `null`.

use crate::config::VersionProfile;
use crate::dispatch::key::Operation;
use crate::item::InputItem;
use serde_json::{Map, Value};

/// Whether the response for this operation should be simplified.
///
/// Three gates, all required: the schema version supports simplification
/// (v2 only), the operation is one of the simplifiable five, and the item
/// opted in via the `simplify` parameter.
pub fn should_simplify(profile: &VersionProfile, operation: Operation, item: &InputItem) -> bool {
    if !profile.supports_simplify {
        return false;
    }
    let simplifiable = matches!(
        operation,
        Operation::RecognizeDocument
            | Operation::RecognizeDocumentAsync
            | Operation::GetAsyncScanResult
            | Operation::GetFlowResults
            | Operation::GetResultByUuid
    );
    simplifiable && item.bool_param("simplify")
}

/// Apply the projection matching the operation; pass through otherwise.
pub fn simplify_response(operation: Operation, response: &Value) -> Value {
    match operation {
        Operation::RecognizeDocument | Operation::RecognizeDocumentAsync => {
            simplify_scan_results(response)
        }
        Operation::GetAsyncScanResult => simplify_async_scan_results(response),
        Operation::GetFlowResults => simplify_flow_results(response),
        Operation::GetResultByUuid => simplify_result_by_uuid(response),
        _ => response.clone(),
    }
}

/// Scan-result projection over an array of recognition results.
pub fn simplify_scan_results(response: &Value) -> Value {
    let Some(results) = response.as_array() else {
        return response.clone();
    };

    let simplified: Vec<Value> = results
        .iter()
        .map(|result| {
            let entry = result.as_object();
            let features = object_field(entry, "features");
            let model = object_field(entry, "model");

            let mut out = Map::new();
            insert_first(&mut out, "uuid", &[field(entry, "uuid"), field(entry, "resultUuid")]);
            insert_first(
                &mut out,
                "modelType",
                &[field(model, "type"), field(entry, "modelType")],
            );
            insert_first(
                &mut out,
                "modelName",
                &[field(model, "name"), field(entry, "modelName")],
            );
            insert_first(
                &mut out,
                "confidence",
                &[field(model, "confidence"), field(entry, "confidence")],
            );
            insert_first(&mut out, "fields", &[field(entry, "fields")]);
            insert_first(
                &mut out,
                "pageCount",
                &[
                    field(entry, "pageCount"),
                    field(object_field(features, "properties"), "pageCount"),
                ],
            );
            insert_array_len(&mut out, "tableCount", field(features, "tables"));
            insert_array_len(&mut out, "faceCount", field(features, "faces"));
            insert_array_len(&mut out, "signatureCount", field(features, "signatures"));
            insert_array_len(&mut out, "stampCount", field(features, "stamps"));

            Value::Object(out)
        })
        .collect();

    Value::Array(simplified)
}

/// Async-wrapped projection: `{status, result: [...]}` keeps its status while
/// the result list gets the scan-result projection. A bare array (server
/// responded without the wrapper) is projected directly.
pub fn simplify_async_scan_results(response: &Value) -> Value {
    if let Some(wrapper) = response.as_object() {
        if wrapper.get("result").is_some_and(Value::is_array) {
            let mut out = Map::new();
            insert_first(&mut out, "status", &[field(Some(wrapper), "status")]);
            out.insert(
                "result".to_string(),
                simplify_scan_results(&wrapper["result"]),
            );
            return Value::Object(out);
        }
        return response.clone();
    }

    if response.is_array() {
        return simplify_scan_results(response);
    }

    response.clone()
}

/// Flow-result listing projection: ordering metadata plus reduced records.
pub fn simplify_flow_results(response: &Value) -> Value {
    let Some(listing) = response.as_object() else {
        return response.clone();
    };

    let results: Vec<Value> = listing
        .get("results")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|item| {
                    let entry = item.as_object();
                    let model = object_field(entry, "model");

                    let mut out = Map::new();
                    insert_first(
                        &mut out,
                        "resultUuid",
                        &[field(entry, "resultUuid"), field(entry, "uuid")],
                    );
                    insert_first(&mut out, "status", &[field(entry, "status")]);
                    insert_first(&mut out, "createdAt", &[field(entry, "createdAt")]);
                    insert_first(&mut out, "updatedAt", &[field(entry, "updatedAt")]);
                    insert_first(&mut out, "fileName", &[field(entry, "fileName")]);
                    insert_first(
                        &mut out,
                        "modelType",
                        &[field(model, "type"), field(entry, "modelType")],
                    );
                    insert_first(
                        &mut out,
                        "modelName",
                        &[field(model, "name"), field(entry, "modelName")],
                    );
                    insert_first(&mut out, "errorCode", &[field(entry, "errorCode")]);
                    insert_first(&mut out, "errorMessage", &[field(entry, "errorMessage")]);
                    insert_first(
                        &mut out,
                        "additionalListColumns",
                        &[field(entry, "additionalListColumns")],
                    );

                    Value::Object(out)
                })
                .collect()
        })
        .unwrap_or_default();

    let mut out = Map::new();
    insert_first(&mut out, "orderBy", &[field(Some(listing), "orderBy")]);
    out.insert("results".to_string(), Value::Array(results));
    Value::Object(out)
}

/// Single-result projection: flatten the one-element `result` array,
/// preferring top-level fields over nested ones for status/timestamps.
pub fn simplify_result_by_uuid(response: &Value) -> Value {
    let Some(wrapper) = response.as_object() else {
        return response.clone();
    };

    let first = wrapper
        .get("result")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .and_then(Value::as_object);
    let model = object_field(first, "model");

    let mut out = Map::new();
    insert_first(
        &mut out,
        "resultUuid",
        &[
            field(first, "uuid"),
            field(Some(wrapper), "resultUuid"),
            field(Some(wrapper), "uuid"),
        ],
    );
    insert_first(
        &mut out,
        "fileName",
        &[field(Some(wrapper), "fileName"), field(first, "fileName")],
    );
    insert_first(
        &mut out,
        "status",
        &[
            field(Some(wrapper), "hitlStatus"),
            field(Some(wrapper), "status"),
            field(first, "status"),
        ],
    );
    insert_first(
        &mut out,
        "createdAt",
        &[field(Some(wrapper), "createdAt"), field(first, "createdAt")],
    );
    insert_first(
        &mut out,
        "updatedAt",
        &[field(Some(wrapper), "updatedAt"), field(first, "updatedAt")],
    );
    insert_first(
        &mut out,
        "modelType",
        &[field(model, "type"), field(first, "modelType")],
    );
    insert_first(
        &mut out,
        "modelName",
        &[field(model, "name"), field(first, "modelName")],
    );
    insert_first(
        &mut out,
        "fields",
        &[field(first, "fields"), field(Some(wrapper), "fields")],
    );
    insert_first(
        &mut out,
        "errorCode",
        &[field(Some(wrapper), "errorCode"), field(first, "errorCode")],
    );
    insert_first(
        &mut out,
        "errorMessage",
        &[
            field(Some(wrapper), "errorMessage"),
            field(first, "errorMessage"),
        ],
    );

    Value::Object(out)
}

// ── Projection helpers ───────────────────────────────────────────────────

/// A field on an optional object, with `null` collapsed to absent.
fn field<'a>(object: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    object.and_then(|o| o.get(key)).filter(|v| !v.is_null())
}

/// A nested object field, or `None` when absent or not an object.
fn object_field<'a>(
    object: Option<&'a Map<String, Value>>,
    key: &str,
) -> Option<&'a Map<String, Value>> {
    field(object, key).and_then(Value::as_object)
}

/// Insert the first present candidate under `key`; omit the key otherwise.
fn insert_first(out: &mut Map<String, Value>, key: &str, candidates: &[Option<&Value>]) {
    if let Some(value) = candidates.iter().flatten().next() {
        out.insert(key.to_string(), (*value).clone());
    }
}

/// Insert the length of an array value; omit when the value is not an array.
fn insert_array_len(out: &mut Map<String, Value>, key: &str, value: Option<&Value>) {
    if let Some(items) = value.and_then(Value::as_array) {
        out.insert(key.to_string(), Value::from(items.len() as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scan_projection_counts_features() {
        let raw = json!([{
            "uuid": "u-1",
            "model": { "type": "finance/invoice", "name": "Invoice", "confidence": 0.97 },
            "fields": { "total": { "value": "41.50" } },
            "features": {
                "tables": [{}, {}],
                "faces": [],
                "signatures": [{}],
                "properties": { "pageCount": 3 },
            },
        }]);

        let simplified = simplify_scan_results(&raw);
        assert_eq!(
            simplified,
            json!([{
                "uuid": "u-1",
                "modelType": "finance/invoice",
                "modelName": "Invoice",
                "confidence": 0.97,
                "fields": { "total": { "value": "41.50" } },
                "pageCount": 3,
                "tableCount": 2,
                "faceCount": 0,
                "signatureCount": 1,
            }])
        );
    }

    #[test]
    fn scan_projection_legacy_fallback_names() {
        let raw = json!([{
            "resultUuid": "legacy-u",
            "modelType": "id/passport",
            "modelName": "Passport",
            "confidence": 0.8,
        }]);
        let simplified = simplify_scan_results(&raw);
        assert_eq!(
            simplified,
            json!([{
                "uuid": "legacy-u",
                "modelType": "id/passport",
                "modelName": "Passport",
                "confidence": 0.8,
            }])
        );
    }

    #[test]
    fn scan_projection_passes_non_array_through() {
        let raw = json!({ "message": "unexpected shape" });
        assert_eq!(simplify_scan_results(&raw), raw);
    }

    #[test]
    fn async_projection_preserves_status() {
        let raw = json!({
            "status": "processing",
            "result": [{ "uuid": "u-2", "model": { "type": "other" } }],
        });
        let simplified = simplify_async_scan_results(&raw);
        assert_eq!(simplified["status"], json!("processing"));
        assert_eq!(simplified["result"][0]["uuid"], json!("u-2"));
        assert_eq!(simplified["result"][0]["modelType"], json!("other"));
    }

    #[test]
    fn async_projection_handles_bare_array() {
        let raw = json!([{ "uuid": "u-3" }]);
        let simplified = simplify_async_scan_results(&raw);
        assert_eq!(simplified, json!([{ "uuid": "u-3" }]));
    }

    #[test]
    fn flow_listing_projection_reduces_entries() {
        let raw = json!({
            "orderBy": "updatedAt",
            "results": [{
                "resultUuid": "r-1",
                "status": "approved",
                "createdAt": 1700000000000u64,
                "updatedAt": 1700000050000u64,
                "fileName": "invoice.pdf",
                "model": { "type": "finance/invoice", "name": "Invoice" },
                "hitl": { "internal": "dropped" },
            }],
        });
        let simplified = simplify_flow_results(&raw);
        assert_eq!(simplified["orderBy"], json!("updatedAt"));
        let entry = &simplified["results"][0];
        assert_eq!(entry["resultUuid"], json!("r-1"));
        assert_eq!(entry["modelType"], json!("finance/invoice"));
        assert!(entry.get("hitl").is_none());
    }

    /// Feeding a canonical raw listing through the projection twice must be
    /// stable: the second pass sees already-reduced entries whose field
    /// names are their own fallbacks.
    #[test]
    fn flow_listing_projection_is_idempotent() {
        let raw = json!({
            "orderBy": "createdAt",
            "results": [{
                "uuid": "r-2",
                "status": "rejected",
                "errorCode": "E42",
                "errorMessage": "unreadable",
            }],
        });
        let once = simplify_flow_results(&raw);
        let twice = simplify_flow_results(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn result_by_uuid_prefers_top_level_then_nested() {
        let raw = json!({
            "hitlStatus": "needsReview",
            "status": "processed",
            "updatedAt": 2,
            "fileName": "top.pdf",
            "result": [{
                "uuid": "nested-u",
                "status": "nested",
                "createdAt": 1,
                "model": { "type": "other", "name": "Other" },
                "fields": { "a": 1 },
            }],
        });
        let simplified = simplify_result_by_uuid(&raw);
        assert_eq!(simplified["resultUuid"], json!("nested-u"));
        // hitlStatus outranks both status fields.
        assert_eq!(simplified["status"], json!("needsReview"));
        assert_eq!(simplified["createdAt"], json!(1));
        assert_eq!(simplified["updatedAt"], json!(2));
        assert_eq!(simplified["fileName"], json!("top.pdf"));
        assert_eq!(simplified["fields"], json!({ "a": 1 }));
    }

    #[test]
    fn null_values_fall_through_fallback_chains() {
        let raw = json!([{
            "uuid": null,
            "resultUuid": "fallback-u",
        }]);
        let simplified = simplify_scan_results(&raw);
        assert_eq!(simplified[0]["uuid"], json!("fallback-u"));
    }

    #[test]
    fn gating_requires_version_operation_and_opt_in() {
        use crate::config::SchemaVersion;
        let item = InputItem::new(
            json!({ "simplify": true }).as_object().cloned().unwrap(),
        );

        let v2 = SchemaVersion::V2.profile();
        assert!(should_simplify(&v2, Operation::RecognizeDocument, &item));
        assert!(!should_simplify(&v2, Operation::ListFlows, &item));

        // v1 never simplifies, opted in or not.
        let v1 = SchemaVersion::V1.profile();
        assert!(!should_simplify(&v1, Operation::RecognizeDocument, &item));

        // Opt-in defaults to off.
        let silent = InputItem::default();
        assert!(!should_simplify(&v2, Operation::RecognizeDocument, &silent));
    }
}
