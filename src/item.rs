//! Batch input and output records.
//!
//! An [`InputItem`] is one unit of the batch: a flat map of named parameters
//! (the host workflow's configuration block, already resolved per item) plus
//! an optional map of binary attachments. The dispatcher reads items, never
//! mutates them.
//!
//! A [`ResultItem`] is what the batch produces per input item — either the
//! (optionally simplified) provider response or an `{"error": …}` envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A binary attachment carried by an input item.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct BinaryPayload {
    /// Raw bytes, exactly as attached upstream.
    #[serde(with = "serde_bytes_base64")]
    pub data: Vec<u8>,
    /// Declared MIME type; `application/octet-stream` is assumed when absent.
    pub mime_type: Option<String>,
    /// Original file name, when the upstream node knew one.
    pub file_name: Option<String>,
}

// Keep Debug readable: a multi-megabyte scan dump helps nobody.
impl std::fmt::Debug for BinaryPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinaryPayload")
            .field("data", &format!("<{} bytes>", self.data.len()))
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

impl BinaryPayload {
    /// Create a payload from raw bytes and an optional MIME type.
    pub fn new(data: impl Into<Vec<u8>>, mime_type: Option<String>) -> Self {
        Self {
            data: data.into(),
            mime_type,
            file_name: None,
        }
    }
}

/// One unit of the input batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputItem {
    /// Named parameters: strings, numbers, booleans, nested option objects.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Binary-property name → attachment.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub binary: HashMap<String, BinaryPayload>,
}

impl InputItem {
    /// Create an item from a parameter map.
    pub fn new(params: Map<String, Value>) -> Self {
        Self {
            params,
            binary: HashMap::new(),
        }
    }

    /// Attach a binary payload under the given property name.
    pub fn with_binary(mut self, property: impl Into<String>, payload: BinaryPayload) -> Self {
        self.binary.insert(property.into(), payload);
        self
    }

    /// Raw parameter lookup.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// A string parameter, if present and a string.
    pub fn string_param(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Value::as_str)
    }

    /// A string parameter, trimmed, with empty-after-trim collapsed to `None`.
    pub fn trimmed_param(&self, name: &str) -> Option<&str> {
        self.string_param(name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// A boolean parameter; absent or non-boolean reads as `false`.
    pub fn bool_param(&self, name: &str) -> bool {
        self.param(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// A nested option-collection parameter (e.g. `resultFilters`).
    pub fn object_param(&self, name: &str) -> Option<&Map<String, Value>> {
        self.param(name).and_then(Value::as_object)
    }

    /// A binary attachment by property name.
    pub fn binary_property(&self, name: &str) -> Option<&BinaryPayload> {
        self.binary.get(name)
    }
}

/// The outcome recorded for one input item.
///
/// Created once, appended to the output sequence, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultItem {
    /// The provider's JSON response, possibly simplified.
    Success(Value),
    /// The per-item failure envelope.
    Error { error: String },
}

impl ResultItem {
    /// Wrap a failure message in the error envelope.
    pub fn from_error(error: impl std::fmt::Display) -> Self {
        ResultItem::Error {
            error: error.to_string(),
        }
    }

    /// Whether this item succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ResultItem::Success(_))
    }

    /// Render as the JSON value the host receives: the payload itself, or
    /// `{"error": message}`.
    pub fn to_json(&self) -> Value {
        match self {
            ResultItem::Success(value) => value.clone(),
            ResultItem::Error { error } => serde_json::json!({ "error": error }),
        }
    }
}

/// Serde helper: binary payload bytes as base64 strings in JSON.
///
/// Items round-trip through JSON at the CLI boundary; raw byte arrays would
/// serialise as huge integer lists.
mod serde_bytes_base64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_with(params: Value) -> InputItem {
        match params {
            Value::Object(map) => InputItem::new(map),
            _ => panic!("test params must be an object"),
        }
    }

    #[test]
    fn trimmed_param_collapses_whitespace_to_none() {
        let item = item_with(json!({ "resultUuid": "   " }));
        assert_eq!(item.trimmed_param("resultUuid"), None);

        let item = item_with(json!({ "resultUuid": "  abc  " }));
        assert_eq!(item.trimmed_param("resultUuid"), Some("abc"));
    }

    #[test]
    fn bool_param_defaults_false() {
        let item = item_with(json!({ "simplify": true }));
        assert!(item.bool_param("simplify"));
        assert!(!item.bool_param("missing"));
        let item = item_with(json!({ "simplify": "yes" }));
        assert!(!item.bool_param("simplify"));
    }

    #[test]
    fn result_item_error_envelope() {
        let r = ResultItem::from_error("Flow ID is required to retrieve results.");
        assert_eq!(
            r.to_json(),
            json!({ "error": "Flow ID is required to retrieve results." })
        );
    }

    #[test]
    fn binary_payload_json_round_trip() {
        let item = InputItem::default().with_binary(
            "data",
            BinaryPayload::new(vec![0u8, 159, 146, 150], Some("image/png".into())),
        );
        let encoded = serde_json::to_string(&item).unwrap();
        let decoded: InputItem = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            decoded.binary_property("data").unwrap().data,
            vec![0u8, 159, 146, 150]
        );
    }

    #[test]
    fn binary_debug_hides_bytes() {
        let payload = BinaryPayload::new(vec![1u8; 4096], None);
        let rendered = format!("{payload:?}");
        assert!(rendered.contains("<4096 bytes>"));
        assert!(rendered.len() < 200);
    }
}
