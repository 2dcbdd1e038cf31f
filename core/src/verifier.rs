//! Access verifier capability.
//!
//! Credential issuance lives outside the engine; the engine only
//! consumes a `verify(token) → identity` capability. The trait is the
//! seam, [`SignedTokenVerifier`] the built-in adapter: a MAC'd claims
//! blob checked in constant time, enough for deployments that mint
//! tokens out-of-band and for the demo server.

use crate::error::{CoordinationError, Result};
use crate::model::{Role, UserId};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// The identity a verified credential resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject id
    pub user_id: UserId,
    /// Subject email
    pub email: String,
    /// Subject role
    pub role: Role,
}

/// Validates a bearer credential and yields the identity behind it.
#[async_trait]
pub trait AccessVerifier: Send + Sync {
    /// Verify `token`.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinationError::Authentication`] if the token is
    /// malformed, tampered with, or unknown.
    async fn verify(&self, token: &str) -> Result<Identity>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    email: String,
    role: Role,
}

/// Shared-secret token verifier.
///
/// Token layout: `base64url(claims) . base64url(sha256(secret ‖ claims))`.
/// The MAC comparison is constant-time.
#[derive(Clone)]
pub struct SignedTokenVerifier {
    secret: Vec<u8>,
}

impl SignedTokenVerifier {
    /// Create a verifier over `secret`.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a token for `identity`.
    ///
    /// Issuance policy (expiry, rotation) belongs to the external
    /// credential service; this exists for tests and the demo server.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinationError::Storage`] if claims serialization
    /// fails.
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        let claims = Claims {
            sub: identity.user_id.0,
            email: identity.email.clone(),
            role: identity.role,
        };
        let payload = serde_json::to_vec(&claims).map_err(CoordinationError::storage)?;
        let mac = self.mac(&payload);
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(mac)
        ))
    }

    fn mac(&self, payload: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(payload);
        hasher.finalize().into()
    }
}

#[async_trait]
impl AccessVerifier for SignedTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity> {
        let (payload_b64, mac_b64) = token
            .split_once('.')
            .ok_or_else(|| CoordinationError::authentication("Malformed token"))?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CoordinationError::authentication("Malformed token"))?;
        let mac = URL_SAFE_NO_PAD
            .decode(mac_b64)
            .map_err(|_| CoordinationError::authentication("Malformed token"))?;

        let expected = self.mac(&payload);
        if !constant_time_eq(&expected, &mac) {
            return Err(CoordinationError::authentication("Signature mismatch"));
        }

        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|_| CoordinationError::authentication("Malformed claims"))?;

        Ok(Identity {
            user_id: UserId(claims.sub),
            email: claims.email,
            role: claims.role,
        })
    }
}
