//! Authenticated-caller extraction.
//!
//! Identity verification itself is the auth provider's job; this layer trusts
//! the bearer token as the caller's opaque user id and only enforces that one
//! is present. Handlers receive the identity explicitly instead of looking it
//! up inside business logic.

use crate::domain::UserId;
use crate::error::AppError;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The authenticated caller, extracted from `Authorization: Bearer <user-id>`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserId);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Invalid bearer token".to_string()))?;

        Ok(AuthUser(UserId::new(token.to_string())))
    }
}
