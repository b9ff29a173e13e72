//! Configuration types for the Base64.ai dispatcher.
//!
//! All dispatch behaviour is controlled through [`ClientConfig`], built via
//! its [`ClientConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across tasks, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! # Schema versioning
//! Two generations of the plugin schema coexist in the wild. Rather than
//! branching on a version tag inside every request builder, the version is
//! resolved **once** into a [`VersionProfile`] — a plain struct answering
//! every version-dependent question (base URL, limit bound, flow-selection
//! style, sorting, simplification). Builders only ever consult the profile.

use crate::error::BatchError;
use serde::{Deserialize, Serialize};

/// Default base endpoint for current (v2) accounts.
pub const BASE_URL_V2: &str = "https://base64.ai/api";

/// Historical base endpoint used by legacy (v1) accounts.
pub const BASE_URL_V1: &str = "https://api.base64.ai";

/// Which generation of the parameter schema an invocation uses.
///
/// The tag changes parameter resolution (dual-field vs resource-locator flow
/// selection), the default base URL, the flow-result limit bound, and
/// whether sorting and response simplification are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// Legacy schema: `scan`/`async` resource naming, dual-field flow
    /// selection, limit ≤ 500, no sorting, no simplification.
    V1,
    /// Current schema: `document` resource, resource-locator flow selection,
    /// limit ≤ 100, sorting and simplification available. (default)
    #[default]
    V2,
}

impl SchemaVersion {
    /// Resolve the version tag into its behaviour profile.
    pub fn profile(self) -> VersionProfile {
        match self {
            SchemaVersion::V1 => VersionProfile {
                version: self,
                default_base_url: BASE_URL_V1,
                max_result_limit: 500,
                supports_sorting: false,
                supports_simplify: false,
                locator_flow_selection: false,
            },
            SchemaVersion::V2 => VersionProfile {
                version: self,
                default_base_url: BASE_URL_V2,
                max_result_limit: 100,
                supports_sorting: true,
                supports_simplify: true,
                locator_flow_selection: true,
            },
        }
    }
}

/// Version-dependent behaviour, resolved once per invocation.
///
/// Every field answers one question a request builder would otherwise have
/// to ask the version tag directly.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VersionProfile {
    /// The tag this profile was resolved from.
    pub version: SchemaVersion,
    /// Base endpoint used when [`ClientConfig::base_url`] is not overridden.
    pub default_base_url: &'static str,
    /// Upper bound for the `limit` flow-result filter (lower bound is 1).
    pub max_result_limit: u32,
    /// Whether the `orderBy` sorting parameter is honoured.
    pub supports_sorting: bool,
    /// Whether opt-in response simplification is available.
    pub supports_simplify: bool,
    /// Whether flow IDs come from a resource-locator parameter
    /// (`documentFlow`/`resultFlow`) instead of the legacy dual fields.
    pub locator_flow_selection: bool,
}

/// What the executor does when one item of the batch fails.
///
/// Modelled as an explicit config field, never global state, so two
/// concurrent invocations can use different policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionPolicy {
    /// The first failing item aborts the whole batch. (default)
    #[default]
    Abort,
    /// A failing item becomes an `{"error": …}` result and the batch
    /// proceeds with the next item.
    ContinueOnFailure,
}

/// Configuration for one dispatcher invocation.
///
/// Built via [`ClientConfig::builder()`] or [`ClientConfig::default()`].
///
/// # Example
/// ```rust
/// use base64ai_client::{ClientConfig, ExecutionPolicy, SchemaVersion};
///
/// let config = ClientConfig::builder()
///     .schema_version(SchemaVersion::V2)
///     .policy(ExecutionPolicy::ContinueOnFailure)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ClientConfig {
    /// Schema generation this invocation speaks. Default: [`SchemaVersion::V2`].
    pub schema_version: SchemaVersion,

    /// Base endpoint override. When `None`, the version profile's default
    /// base URL applies. Trailing slashes are tolerated.
    pub base_url: Option<String>,

    /// Failure policy for the item loop. Default: [`ExecutionPolicy::Abort`].
    pub policy: ExecutionPolicy,

    /// Per-request timeout in seconds. Default: 120.
    ///
    /// Async scans upload whole documents in the request body, so the
    /// default is generous. Retry and backoff are deliberately out of scope;
    /// the timeout only bounds a single attempt.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            base_url: None,
            policy: ExecutionPolicy::default(),
            request_timeout_secs: 120,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// The behaviour profile for this invocation's schema version.
    pub fn profile(&self) -> VersionProfile {
        self.schema_version.profile()
    }

    /// The effective base endpoint, without a trailing slash.
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(self.profile().default_base_url)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn schema_version(mut self, version: SchemaVersion) -> Self {
        self.config.schema_version = version;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn policy(mut self, policy: ExecutionPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, BatchError> {
        if let Some(ref url) = self.config.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(BatchError::InvalidConfig(format!(
                    "Base URL must be an HTTP(S) URL, got '{url}'"
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_profile_is_legacy() {
        let p = SchemaVersion::V1.profile();
        assert_eq!(p.default_base_url, BASE_URL_V1);
        assert_eq!(p.max_result_limit, 500);
        assert!(!p.supports_sorting);
        assert!(!p.supports_simplify);
        assert!(!p.locator_flow_selection);
    }

    #[test]
    fn v2_profile_is_current() {
        let p = SchemaVersion::V2.profile();
        assert_eq!(p.default_base_url, BASE_URL_V2);
        assert_eq!(p.max_result_limit, 100);
        assert!(p.supports_sorting);
        assert!(p.supports_simplify);
        assert!(p.locator_flow_selection);
    }

    #[test]
    fn base_url_override_wins_and_is_trimmed() {
        let config = ClientConfig::builder()
            .base_url("https://on-prem.example.com/api/")
            .build()
            .unwrap();
        assert_eq!(
            config.effective_base_url(),
            "https://on-prem.example.com/api"
        );
    }

    #[test]
    fn default_base_url_follows_version() {
        let config = ClientConfig::builder()
            .schema_version(SchemaVersion::V1)
            .build()
            .unwrap();
        assert_eq!(config.effective_base_url(), BASE_URL_V1);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ClientConfig::builder()
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Base URL"));
    }
}
