//! Flow-identifier resolution.
//!
//! Two parameter layouts exist for choosing a flow, and the schema version
//! decides which applies:
//!
//! * **Legacy (v1)** — a `*FlowSelection` parameter (`list` or `manual`)
//!   picks between a dropdown-selected ID (`*FlowId`) and a free-text ID
//!   (`*FlowIdManual`).
//! * **Current (v2)** — a single resource-locator parameter
//!   (`documentFlow`/`resultFlow`) carries its own mode and value; only the
//!   value matters here.
//!
//! Scan operations treat the flow as optional (the server falls back to the
//! account's default flow when the header is absent); result retrieval
//! requires one.

use crate::config::VersionProfile;
use crate::error::ItemError;
use crate::item::InputItem;
use serde_json::Value;

/// Which parameter family a flow ID is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowParams {
    /// `documentFlow` / `documentFlowSelection` / `documentFlowId` / `documentFlowIdManual`
    Document,
    /// `resultFlow` / `resultFlowSelection` / `resultFlowId` / `resultFlowIdManual`
    Result,
}

impl FlowParams {
    fn locator(self) -> &'static str {
        match self {
            FlowParams::Document => "documentFlow",
            FlowParams::Result => "resultFlow",
        }
    }

    fn selection(self) -> &'static str {
        match self {
            FlowParams::Document => "documentFlowSelection",
            FlowParams::Result => "resultFlowSelection",
        }
    }

    fn list_field(self) -> &'static str {
        match self {
            FlowParams::Document => "documentFlowId",
            FlowParams::Result => "resultFlowId",
        }
    }

    fn manual_field(self) -> &'static str {
        match self {
            FlowParams::Document => "documentFlowIdManual",
            FlowParams::Result => "resultFlowIdManual",
        }
    }
}

/// Resolve an optional flow ID for scan-type operations.
///
/// Returns `None` when the user left the flow unset — the caller must then
/// omit the flow header entirely rather than send an empty value.
pub fn resolve_optional(
    profile: &VersionProfile,
    item: &InputItem,
    params: FlowParams,
) -> Option<String> {
    if profile.locator_flow_selection {
        locator_value(item, params.locator())
    } else {
        legacy_value(item, params)
    }
}

/// Resolve a required flow ID for result retrieval.
pub fn resolve_required(
    profile: &VersionProfile,
    item: &InputItem,
    params: FlowParams,
) -> Result<String, ItemError> {
    resolve_optional(profile, item, params)
        .ok_or_else(|| ItemError::validation("Flow ID is required to retrieve results."))
}

/// Read a resource-locator parameter's value.
///
/// Accepts both the structured `{ "mode": …, "value": … }` object and a
/// plain string, since expressions may inject either.
fn locator_value(item: &InputItem, name: &str) -> Option<String> {
    let value = match item.param(name)? {
        Value::Object(locator) => locator.get("value")?.as_str()?,
        Value::String(s) => s.as_str(),
        _ => return None,
    };
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Read a legacy dual-field flow ID, honouring the selection mode.
fn legacy_value(item: &InputItem, params: FlowParams) -> Option<String> {
    // Selection defaults to "list" when absent, as the original UI did.
    let selection = item.string_param(params.selection()).unwrap_or("list");
    let field = if selection == "manual" {
        params.manual_field()
    } else {
        params.list_field()
    };
    item.trimmed_param(field).map(str::to_string)
}
