//! Dispatch stages: from item parameters to a fully-formed request.
//!
//! Each submodule implements exactly one step of the Build phase. Keeping
//! the steps separate makes each independently testable and keeps the
//! version-dependent parts (flow resolution) away from the pure ones
//! (payload encoding).
//!
//! ## Data Flow
//!
//! ```text
//! item ──▶ key ──▶ flow ──▶ payload ──▶ builders
//! (params) (resolve) (flow ID) (data URI)  (RequestSpec)
//! ```
//!
//! 1. [`key`]      — resolve the `resource`/`operation` string pair into an
//!    [`key::OperationKey`]; unknown pairs fail as unsupported, per item
//! 2. [`flow`]     — resolve the optional/required flow identifier using the
//!    strategy the schema version dictates
//! 3. [`payload`]  — re-encode a binary attachment as a `data:` URI
//! 4. [`builders`] — assemble the [`crate::request::RequestSpec`] for the
//!    resolved operation, including query-filter construction

pub mod builders;
pub mod flow;
pub mod key;
pub mod payload;
