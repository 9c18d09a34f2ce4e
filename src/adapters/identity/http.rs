//! HTTP adapter for the external identity store.
//!
//! Collaborator tokens are opaque here: the store is asked whether a token
//! is valid and answers yes or no. Nothing is cached - admin mutations are
//! rare and revocation should take effect immediately.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::ports::{AuthError, IdentityVerifier};

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    valid: bool,
}

/// Identity verifier backed by an external HTTP identity store.
pub struct HttpIdentityVerifier {
    url: String,
    api_key: Secret<String>,
    client: reqwest::Client,
}

impl HttpIdentityVerifier {
    /// Build a verifier from the auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        Ok(Self {
            url: config.identity_url.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&CheckRequest { token })
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Unavailable(format!(
                "identity store returned {}",
                response.status()
            )));
        }

        let check: CheckResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if check.valid {
            Ok(())
        } else {
            Err(AuthError::Rejected)
        }
    }
}

impl std::fmt::Debug for HttpIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityVerifier")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
