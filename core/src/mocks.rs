//! Test doubles, available with the `test-utils` feature (on by
//! default).

use crate::error::{CoordinationError, Result};
use crate::model::Role;
use crate::verifier::{AccessVerifier, Identity};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Verifier backed by a fixed token → identity table.
///
/// Unknown tokens fail with an authentication error, matching the real
/// adapter's behavior.
#[derive(Debug, Default)]
pub struct StaticVerifier {
    identities: Mutex<HashMap<String, Identity>>,
}

impl StaticVerifier {
    /// Create an empty verifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `identity` under `token`.
    pub fn register(&self, token: impl Into<String>, identity: Identity) {
        self.lock().insert(token.into(), identity);
    }

    /// Register a fresh identity with `role` under `token` and return
    /// it.
    pub fn register_role(&self, token: impl Into<String>, email: &str, role: Role) -> Identity {
        let identity = Identity {
            user_id: crate::model::UserId::new(),
            email: email.to_string(),
            role,
        };
        self.register(token, identity.clone());
        identity
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Identity>> {
        self.identities
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl AccessVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Identity> {
        self.lock()
            .get(token)
            .cloned()
            .ok_or_else(|| CoordinationError::authentication("Unknown token"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_token_resolves() {
        let verifier = StaticVerifier::new();
        let identity = verifier.register_role("admin-token", "admin@example.com", Role::Admin);

        let verified = verifier.verify("admin-token").await.unwrap();
        assert_eq!(verified, identity);
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let verifier = StaticVerifier::new();
        assert!(matches!(
            verifier.verify("nope").await,
            Err(CoordinationError::Authentication { .. })
        ));
    }
}
