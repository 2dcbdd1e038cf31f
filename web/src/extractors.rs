//! Request extractors.
//!
//! [`BearerToken`] pulls the raw credential out of the
//! `Authorization` header; [`CurrentUser`] runs it through the
//! verifier. Handlers take `CurrentUser` as a parameter to require
//! authentication.

use crate::error::AppError;
use crate::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use gatherly_core::verifier::Identity;

/// Bearer token extracted from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("No token provided"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("No token provided"))?;

        if token.is_empty() {
            return Err(AppError::unauthorized("No token provided"));
        }

        Ok(Self(token.to_string()))
    }
}

/// The authenticated identity behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;
        let identity = state.verifier.verify(&bearer.0).await?;
        Ok(Self(identity))
    }
}
