//! The authenticated-identity extractor.
//!
//! Every mutating handler receives the already-resolved caller through
//! [`CurrentUser`]; no handler touches tokens or passwords itself.

use axum::extract::FromRequestParts;
use http::request::Parts;

use super::AppState;
use super::error::ApiError;
use crate::domain::error::DomainError;
use crate::domain::model::User;

/// The caller resolved from the bearer token, including a token-version
/// check against the live record.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| DomainError::unauthorized("missing bearer token"))?;
        let claims = state.tokens.decode(token)?;
        let user = state.service.current_identity(claims.sub, claims.ver)?;
        Ok(Self(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
