//! Authentication route handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};
use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, ErrorCode, Result};
use crate::middleware::RequireAuth;
use crate::models::{Identity, User};
use crate::services::auth::{LoginInput, RegisterInput, Session};
use crate::state::AppState;

use super::ApiResponse;

#[derive(Serialize)]
struct SessionData {
    user: User,
    token: String,
}

impl From<Session> for SessionData {
    fn from(session: Session) -> Self {
        Self {
            user: session.user,
            token: session.token,
        }
    }
}

#[derive(Serialize)]
struct MeData {
    user: Identity,
}

/// Malformed auth bodies are reported like field validation failures.
fn invalid_body(rejection: &JsonRejection) -> AppError {
    AppError::from_json_rejection(rejection, |text| AppError::BadRequest {
        code: ErrorCode::ValidationError,
        message: "Invalid input data".to_owned(),
        errors: Some(vec![text]),
    })
}

/// Register a new account.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterInput>, JsonRejection>,
) -> Result<Response> {
    let Json(input) = payload.map_err(|e| invalid_body(&e))?;
    let session = state.auth().register(input).await?;
    Ok(ApiResponse::created(
        "User registered successfully",
        SessionData::from(session),
    ))
}

/// Exchange credentials for a bearer token.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginInput>, JsonRejection>,
) -> Result<Response> {
    let Json(input) = payload.map_err(|e| invalid_body(&e))?;
    let session = state.auth().login(input).await?;
    Ok(ApiResponse::ok("Login successful", SessionData::from(session)))
}

/// The authenticated caller.
pub async fn me(RequireAuth(identity): RequireAuth) -> Response {
    ApiResponse::ok(
        "User information retrieved successfully",
        MeData { user: identity },
    )
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> Response {
    ApiResponse::ok(
        "Logout successful",
        json!({ "message": "Token should be removed from client storage" }),
    )
}
