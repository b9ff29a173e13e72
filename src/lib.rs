//! # base64ai-client
//!
//! Batch client for the Base64.ai document-understanding REST API.
//!
//! ## Why this crate?
//!
//! Base64.ai exposes a dozen closely related endpoints — synchronous and
//! asynchronous document scans, signature and face recognition/verification,
//! flow listing, and result retrieval — each with its own parameter set,
//! flow-selection rules, and response shape. This crate collapses all of
//! them behind one dispatcher: give it items carrying a `resource` and
//! `operation` plus parameters, and it resolves the pair against a typed
//! registry, normalises binary attachments into `data:` URIs, sends the
//! request, and optionally projects the response down to its useful fields.
//!
//! ## Pipeline Overview
//!
//! ```text
//! InputItem
//!  │
//!  ├─ 1. Resolve   resource/operation strings → typed OperationKey
//!  ├─ 2. Build     parameters + attachments → RequestSpec (path, body, headers)
//!  ├─ 3. Send      one HTTP exchange via the Transport seam
//!  ├─ 4. Simplify  optional projection to the response's essential fields
//!  └─ 5. Collect   per-item success or error envelope, in input order
//! ```
//!
//! Items run strictly sequentially; the configured [`ExecutionPolicy`]
//! decides whether a failing item aborts the batch or is collected as an
//! `{"error": …}` result.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use base64ai_client::{
//!     execute_batch, ClientConfig, Credentials, ExecutionPolicy, HttpTransport, InputItem,
//! };
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials read from BASE64AI_EMAIL / BASE64AI_API_KEY
//!     let transport = HttpTransport::new(Credentials::from_env()?)?;
//!     let config = ClientConfig::builder()
//!         .policy(ExecutionPolicy::ContinueOnFailure)
//!         .build()?;
//!
//!     let item = InputItem::new(
//!         json!({
//!             "resource": "document",
//!             "operation": "recognizeDocument",
//!             "documentInputSource": "url",
//!             "documentUrl": "https://example.com/invoice.pdf",
//!             "simplify": true,
//!         })
//!         .as_object()
//!         .cloned()
//!         .unwrap(),
//!     );
//!
//!     let output = execute_batch(&transport, &config, &[item]).await?;
//!     for result in &output.results {
//!         println!("{}", result.to_json());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `base64ai` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! base64ai-client = { version = "0.2", default-features = false }
//! ```
//!
//! ## Schema Versions
//!
//! Two parameter schemas are supported and resolved once into a
//! [`VersionProfile`]:
//!
//! | | v1 (legacy) | v2 (current) |
//! |---|---|---|
//! | Base URL | `https://api.base64.ai` | `https://base64.ai/api` |
//! | Flow selection | dual-field (`…FlowSelection` + ID) | resource locator |
//! | Result limit | 1–500 | 1–100 |
//! | Result sorting | — | `orderBy` |
//! | Simplified output | — | `simplify` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod execute;
pub mod flows;
pub mod item;
pub mod request;
pub mod simplify;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, ExecutionPolicy, SchemaVersion, VersionProfile};
pub use credentials::Credentials;
pub use dispatch::key::{Operation, OperationKey, Resource};
pub use error::{BatchError, ItemError};
pub use execute::{execute_batch, execute_item, BatchOutput, BatchStats, HttpTransport, Transport};
pub use flows::{list_flows, search_flows, FlowDescriptor};
pub use item::{BinaryPayload, InputItem, ResultItem};
pub use request::RequestSpec;
pub use stream::{execute_stream, ResultStream};
