//! Mock identity verifier for tests.
//!
//! Holds a set of accepted tokens, or simulates an unreachable identity
//! store, so the admin surface can be exercised without a live identity
//! provider.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::ports::{AuthError, IdentityVerifier};

/// Identity verifier accepting a fixed set of tokens.
#[derive(Debug, Default)]
pub struct MockIdentityVerifier {
    tokens: RwLock<HashSet<String>>,
    unavailable: bool,
}

impl MockIdentityVerifier {
    /// A verifier that rejects everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as a valid collaborator token.
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.tokens.write().unwrap().insert(token.into());
        self
    }

    /// A verifier whose identity store can never be reached.
    pub fn unavailable() -> Self {
        Self {
            tokens: RwLock::new(HashSet::new()),
            unavailable: true,
        }
    }

    /// Register another accepted token at runtime.
    pub fn add_token(&self, token: impl Into<String>) {
        self.tokens.write().unwrap().insert(token.into());
    }
}

#[async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<(), AuthError> {
        if self.unavailable {
            return Err(AuthError::Unavailable("identity store offline".to_string()));
        }
        if self.tokens.read().unwrap().contains(token) {
            Ok(())
        } else {
            Err(AuthError::Rejected)
        }
    }
}
