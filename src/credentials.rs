//! Base64.ai API credentials.
//!
//! The provider authenticates every call with a single header of the form
//! `Authorization: ApiKey {email}:{apiKey}`. This module owns that format so
//! the transport never concatenates credential strings itself.

use crate::error::BatchError;
use crate::request::RequestSpec;
use reqwest::Method;

/// Environment variable holding the account email.
pub const ENV_EMAIL: &str = "BASE64AI_EMAIL";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "BASE64AI_API_KEY";

/// An email + API-key pair for a Base64.ai account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    api_key: String,
}

// Manual Debug so the key never leaks into logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from an email and API key.
    pub fn new(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
        }
    }

    /// Read credentials from `BASE64AI_EMAIL` / `BASE64AI_API_KEY`.
    pub fn from_env() -> Result<Self, BatchError> {
        let email = std::env::var(ENV_EMAIL).unwrap_or_default();
        let api_key = std::env::var(ENV_API_KEY).unwrap_or_default();

        if email.is_empty() || api_key.is_empty() {
            return Err(BatchError::CredentialsMissing {
                hint: format!("Set {ENV_EMAIL} and {ENV_API_KEY}, or pass credentials explicitly."),
            });
        }

        Ok(Self::new(email, api_key))
    }

    /// The account email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Render the `Authorization` header value.
    pub fn authorization_header(&self) -> String {
        format!("ApiKey {}:{}", self.email, self.api_key)
    }

    /// The request used to verify a credential pair: `GET /auth/user`.
    ///
    /// Sent against the account's base endpoint; a 2xx means the pair is
    /// valid.
    pub fn verification_request() -> RequestSpec {
        RequestSpec::new(Method::GET, "/auth/user")
    }
}
