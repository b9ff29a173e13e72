//! Request builders: one per operation, matched exhaustively.
//!
//! [`build_request`] is the registry. Every [`Operation`] variant has an arm
//! here, so "unsupported operation" can only arise earlier, during string
//! resolution in [`crate::dispatch::key`]. Builders are pure: they read the
//! item and version profile and produce a wholly-owned
//! [`RequestSpec`], failing with a validation error before any network I/O
//! when a required parameter is absent or malformed.
//!
//! Document-like operations pick exactly one of two input modes, driven by
//! the explicit `*InputSource` discriminator: URL mode passes the string
//! through verbatim as the `url` body field; binary mode delegates to
//! [`crate::dispatch::payload`].

use crate::config::VersionProfile;
use crate::dispatch::flow::{self, FlowParams};
use crate::dispatch::key::{Operation, OperationKey};
use crate::dispatch::payload;
use crate::error::ItemError;
use crate::item::InputItem;
use crate::request::{RequestSpec, FLOW_ID_HEADER};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use serde_json::{Map, Value};

/// Characters escaped in user-supplied path segments (UUIDs).
///
/// Matches JavaScript's `encodeURIComponent`: alphanumerics plus
/// `- _ . ! ~ * ' ( )` pass through, everything else is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Access levels requested when listing flows for UI population.
pub const FLOW_ACCESS_LEVELS: &str = "owner,administrator,uploader";

/// Build the outbound request for a resolved operation key.
pub fn build_request(
    key: &OperationKey,
    profile: &VersionProfile,
    item: &InputItem,
) -> Result<RequestSpec, ItemError> {
    match key.operation {
        Operation::RecognizeDocument => scan_request("/scan", profile, item),
        Operation::RecognizeDocumentAsync => scan_request("/scan/async", profile, item),
        Operation::GetAsyncScanResult => async_result_request(item),
        Operation::RecognizeSignature => single_input_request(
            "/signature",
            item,
            &InputParams {
                source: "signatureRecognitionInputSource",
                url: "signatureRecognitionDocumentUrl",
                binary: "signatureRecognitionBinaryPropertyName",
            },
        ),
        Operation::VerifySignature => dual_input_request(
            "/signature",
            item,
            &InputParams {
                source: "signatureVerificationInputSource",
                url: "signatureVerificationDocumentUrl",
                binary: "signatureVerificationBinaryPropertyName",
            },
            "signatureVerificationQueryUrl",
            "signatureVerificationQueryBinaryPropertyName",
        ),
        Operation::RecognizeFace => single_input_request(
            "/face",
            item,
            &InputParams {
                source: "faceRecognitionInputSource",
                url: "faceRecognitionDocumentUrl",
                binary: "faceRecognitionBinaryPropertyName",
            },
        ),
        Operation::VerifyFace => dual_input_request(
            "/face",
            item,
            &InputParams {
                source: "faceVerificationInputSource",
                url: "faceVerificationDocumentUrl",
                binary: "faceVerificationBinaryPropertyName",
            },
            "faceVerificationQueryUrl",
            "faceVerificationQueryBinaryPropertyName",
        ),
        Operation::ListFlows => Ok(RequestSpec::new(Method::GET, "/flow")),
        Operation::GetFlowResults => flow_results_request(profile, item),
        Operation::GetResultByUuid => result_by_uuid_request(item),
    }
}

// ── Input-mode selection ─────────────────────────────────────────────────

/// Which of the two input modes an operation uses for its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputSource {
    Url,
    Binary,
}

/// Parameter names for one document-like input.
struct InputParams {
    source: &'static str,
    url: &'static str,
    binary: &'static str,
}

fn input_source(item: &InputItem, param: &str) -> Result<InputSource, ItemError> {
    match item.trimmed_param(param) {
        Some("url") => Ok(InputSource::Url),
        Some("binary") => Ok(InputSource::Binary),
        Some(other) => Err(ItemError::validation(format!(
            "Input source must be \"url\" or \"binary\", got \"{other}\"."
        ))),
        None => Err(ItemError::validation("Input source is required.")),
    }
}

fn required_url<'a>(item: &'a InputItem, param: &str) -> Result<&'a str, ItemError> {
    // Presence check only; the value itself is passed through verbatim.
    item.trimmed_param(param)
        .map(|_| item.string_param(param).unwrap_or_default())
        .ok_or_else(|| ItemError::validation(format!("Parameter \"{param}\" is required.")))
}

fn required_binary_name<'a>(item: &'a InputItem, param: &str) -> Result<&'a str, ItemError> {
    item.trimmed_param(param)
        .ok_or_else(|| ItemError::validation(format!("Parameter \"{param}\" is required.")))
}

// ── Scan operations (flow-scoped) ────────────────────────────────────────

/// POST /scan or /scan/async: document input plus the optional flow header.
fn scan_request(
    path: &str,
    profile: &VersionProfile,
    item: &InputItem,
) -> Result<RequestSpec, ItemError> {
    let body = document_body(
        item,
        &InputParams {
            source: "documentInputSource",
            url: "documentUrl",
            binary: "documentBinaryPropertyName",
        },
    )?;

    let mut spec = RequestSpec::new(Method::POST, path).with_body(Value::Object(body));

    // No flow selected means no header at all; the server then applies the
    // account's default flow.
    if let Some(flow_id) = flow::resolve_optional(profile, item, FlowParams::Document) {
        spec = spec.with_header(FLOW_ID_HEADER, flow_id);
    }

    Ok(spec)
}

fn async_result_request(item: &InputItem) -> Result<RequestSpec, ItemError> {
    let uuid = item
        .trimmed_param("asyncFileUuid")
        .ok_or_else(|| ItemError::validation("Async file UUID is required."))?;
    let path = format!("/scan/async/{}", encode_segment(uuid));
    Ok(RequestSpec::new(Method::GET, path))
}

// ── Single- and dual-input bodies ────────────────────────────────────────

fn document_body(item: &InputItem, params: &InputParams) -> Result<Map<String, Value>, ItemError> {
    let mut body = Map::new();
    match input_source(item, params.source)? {
        InputSource::Url => {
            body.insert(
                "url".to_string(),
                Value::String(required_url(item, params.url)?.to_string()),
            );
        }
        InputSource::Binary => {
            let property = required_binary_name(item, params.binary)?;
            body.insert(
                "document".to_string(),
                Value::String(payload::to_data_uri(item, property)?),
            );
        }
    }
    Ok(body)
}

fn single_input_request(
    path: &str,
    item: &InputItem,
    params: &InputParams,
) -> Result<RequestSpec, ItemError> {
    let body = document_body(item, params)?;
    Ok(RequestSpec::new(Method::POST, path).with_body(Value::Object(body)))
}

/// Verification operations carry two independently-normalised inputs:
/// the candidate document and the reference ("query") document. Each data
/// URI is built by its own call so a missing attachment reports exactly
/// which property was absent.
fn dual_input_request(
    path: &str,
    item: &InputItem,
    params: &InputParams,
    query_url_param: &str,
    query_binary_param: &str,
) -> Result<RequestSpec, ItemError> {
    let mut body = Map::new();
    match input_source(item, params.source)? {
        InputSource::Url => {
            body.insert(
                "url".to_string(),
                Value::String(required_url(item, params.url)?.to_string()),
            );
            body.insert(
                "queryUrl".to_string(),
                Value::String(required_url(item, query_url_param)?.to_string()),
            );
        }
        InputSource::Binary => {
            let document_property = required_binary_name(item, params.binary)?;
            let query_property = required_binary_name(item, query_binary_param)?;
            body.insert(
                "document".to_string(),
                Value::String(payload::to_data_uri(item, document_property)?),
            );
            body.insert(
                "queryDocument".to_string(),
                Value::String(payload::to_data_uri(item, query_property)?),
            );
        }
    }
    Ok(RequestSpec::new(Method::POST, path).with_body(Value::Object(body)))
}

// ── Result retrieval ─────────────────────────────────────────────────────

/// GET /result: the required flowID plus only the filters that are actually
/// set. Absent or empty-after-trim filters are omitted from the query
/// entirely, never sent as empty strings.
fn flow_results_request(
    profile: &VersionProfile,
    item: &InputItem,
) -> Result<RequestSpec, ItemError> {
    let flow_id = flow::resolve_required(profile, item, FlowParams::Result)?;
    let mut spec = RequestSpec::new(Method::GET, "/result").with_query("flowID", flow_id);

    let filters = item.object_param("resultFilters");

    if let Some(limit) = filters
        .and_then(|f| f.get("limit"))
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite())
    {
        let bounded = (limit as i64).clamp(1, i64::from(profile.max_result_limit));
        spec = spec.with_query("limit", bounded.to_string());
    }

    for name in ["qPreviousTimestamp", "qNextTimestamp", "filter"] {
        if let Some(value) = filters
            .and_then(|f| f.get(name))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            spec = spec.with_query(name, value);
        }
    }

    // Sorting arrived with the v2 schema; older versions ignore it.
    if profile.supports_sorting {
        if let Some(order_by) = item
            .object_param("resultSorting")
            .and_then(|s| s.get("orderBy"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            spec = spec.with_query("orderBy", order_by);
        }
    }

    Ok(spec)
}

fn result_by_uuid_request(item: &InputItem) -> Result<RequestSpec, ItemError> {
    let uuid = item
        .trimmed_param("resultUuid")
        .ok_or_else(|| ItemError::validation("Result UUID is required."))?;
    let path = format!("/result/{}", encode_segment(uuid));
    Ok(RequestSpec::new(Method::GET, path))
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}
