//! IdentityVerifier port - opaque collaborator-token check.
//!
//! Tokens mean nothing to this service. They are forwarded to an external
//! identity store which answers yes or no; callers collapse every failure
//! (bad token, unreachable store) into one generic rejection so nothing
//! about the identity system leaks to the admin surface.

use async_trait::async_trait;

/// Errors from the identity check.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The identity store answered: not a valid collaborator token
    #[error("Token rejected by identity store")]
    Rejected,

    /// The identity store could not be consulted
    #[error("Identity store unavailable: {0}")]
    Unavailable(String),
}

/// Port for verifying collaborator tokens against the external identity
/// store.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Check one token. `Ok(())` means the caller is a collaborator.
    async fn verify(&self, token: &str) -> Result<(), AuthError>;
}
