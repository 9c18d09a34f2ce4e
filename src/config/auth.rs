//! Identity-store configuration
//!
//! Collaborator tokens are opaque to this service; they are checked against
//! an external identity store and nothing about their contents is assumed.

use secrecy::Secret;
use serde::Deserialize;

use super::error::ValidationError;

/// Identity-store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Endpoint that answers whether a collaborator token is valid
    pub identity_url: String,

    /// Credential presented to the identity store
    pub api_key: Secret<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AuthConfig {
    /// Validate identity-store configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.identity_url.starts_with("http://") && !self.identity_url.starts_with("https://") {
            return Err(ValidationError::InvalidIdentityUrl);
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}
