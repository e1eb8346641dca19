//! Bearer-token authentication extractor.
//!
//! Handlers that need a caller take [`RequireAuth`]; the identity comes only
//! from the verified token, never from the request body.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::Identity;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Rejects with `AUTH_REQUIRED` when no token is presented and
/// `INVALID_TOKEN` when the token is bad, expired, or names a deleted user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(identity): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", identity.name)
/// }
/// ```
pub struct RequireAuth(pub Identity);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::AuthRequired)?;
        let identity = state.auth().verify(token).await?;

        tracing::Span::current().record("user_id", tracing::field::display(identity.id));
        set_sentry_user(&identity.id, Some(identity.email.as_str()));

        Ok(Self(identity))
    }
}

/// Token from an `Authorization: Bearer <token>` header, if present.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
