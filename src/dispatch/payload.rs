//! Payload normalisation: binary attachment → `data:` URI.
//!
//! The scan endpoints accept a document either as a public URL or as a
//! self-contained data URI embedded in the JSON body. This module handles
//! the second form: read the attachment's bytes, base64-encode them, and
//! prefix the declared MIME type. The bytes are encoded exactly as attached
//! — no transformation, compression, or re-encoding beyond base64.

use crate::error::ItemError;
use crate::item::InputItem;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// MIME type assumed when the attachment does not declare one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Re-encode the named binary property as a `data:<mime>;base64,<payload>` string.
///
/// Fails with [`ItemError::MissingBinary`] naming the property when the item
/// carries no attachment under that name — the specific name matters because
/// dual-input operations call this twice and the user needs to know which of
/// the two is missing.
pub fn to_data_uri(item: &InputItem, property: &str) -> Result<String, ItemError> {
    let payload = item
        .binary_property(property)
        .ok_or_else(|| ItemError::MissingBinary {
            property: property.to_string(),
        })?;

    let mime_type = payload.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE);
    let encoded = STANDARD.encode(&payload.data);
    debug!(
        "Encoded binary property '{}' ({} bytes) as {} data URI",
        property,
        payload.data.len(),
        mime_type
    );

    Ok(format!("data:{mime_type};base64,{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::BinaryPayload;

    #[test]
    fn round_trips_bytes_exactly() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let item = InputItem::default()
            .with_binary("data", BinaryPayload::new(bytes.clone(), Some("application/pdf".into())));

        let uri = to_data_uri(&item, "data").expect("encode should succeed");
        let payload = uri
            .strip_prefix("data:application/pdf;base64,")
            .expect("prefix must carry the declared MIME type");
        assert_eq!(STANDARD.decode(payload).unwrap(), bytes);
    }

    #[test]
    fn defaults_mime_type_when_undeclared() {
        let item = InputItem::default().with_binary("scan", BinaryPayload::new(b"%PDF".to_vec(), None));
        let uri = to_data_uri(&item, "scan").unwrap();
        assert!(uri.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn missing_property_echoes_its_name() {
        let item = InputItem::default()
            .with_binary("other", BinaryPayload::new(vec![1, 2, 3], None));
        let err = to_data_uri(&item, "data").unwrap_err();
        match err {
            ItemError::MissingBinary { ref property } => assert_eq!(property, "data"),
            ref other => panic!("expected MissingBinary, got {other:?}"),
        }
        assert!(err.to_string().contains("\"data\""));
    }

    #[test]
    fn empty_attachment_is_still_valid() {
        let item = InputItem::default().with_binary("data", BinaryPayload::new(vec![], None));
        let uri = to_data_uri(&item, "data").unwrap();
        assert_eq!(uri, "data:application/octet-stream;base64,");
    }
}
