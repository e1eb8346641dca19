//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`. Every failure is rendered as the JSON envelope
//! `{ success: false, message, error: CODE, errors? }`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use enzi_core::ReconcileError;

use crate::db::RepositoryError;
use crate::services::{AuthError, OrderError};

/// Stable machine-readable error codes returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    InvalidOrderData,
    EmptyOrder,
    InvalidMenuItem,
    /// Reserved for clients that distinguish unavailable items; the server
    /// reports unavailable items as `INVALID_MENU_ITEM`.
    ItemNotAvailable,
    TotalMismatch,
    ItemCountMismatch,
    AuthRequired,
    InvalidToken,
    InvalidCredentials,
    EmailExists,
    OrderNotFound,
    InvalidCategory,
    InvalidItemId,
    ItemNotFound,
    InvalidSearchQuery,
    NotFound,
    RateLimited,
    PayloadTooLarge,
    RequestTimeout,
    PersistenceError,
    InternalError,
}

impl From<&ReconcileError> for ErrorCode {
    fn from(err: &ReconcileError) -> Self {
        match err {
            ReconcileError::EmptyOrder => Self::EmptyOrder,
            ReconcileError::InvalidMenuItem { .. } => Self::InvalidMenuItem,
            ReconcileError::TotalMismatch { .. } => Self::TotalMismatch,
            ReconcileError::ItemCountMismatch { .. } => Self::ItemCountMismatch,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub error: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request failed shape validation.
    #[error("Bad request: {message}")]
    BadRequest {
        code: ErrorCode,
        message: String,
        errors: Option<Vec<String>>,
    },

    /// Order proposal disagreed with the catalog.
    #[error("Order rejected: {0}")]
    Rejected(#[from] ReconcileError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// No bearer token was presented.
    #[error("Authentication required")]
    AuthRequired,

    /// Resource not found (or not owned by the caller).
    #[error("Not found: {message}")]
    NotFound { code: ErrorCode, message: String },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Request body over the size limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Request did not finish within the deadline.
    #[error("Request timed out")]
    Timeout,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// A 400 with a single message.
    pub fn bad_request(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
            errors: None,
        }
    }

    /// A 404.
    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    /// Map a JSON body rejection. Oversized bodies become `PayloadTooLarge`;
    /// anything else is handed to `otherwise` with the rejection text.
    pub fn from_json_rejection(
        rejection: &JsonRejection,
        otherwise: impl FnOnce(String) -> Self,
    ) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            otherwise(rejection.body_text())
        }
    }

    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::Auth(
                    AuthError::Repository(_) | AuthError::PasswordHash | AuthError::TokenSigning(_)
                )
        )
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } | Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials | AuthError::InvalidToken => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::EmailExists => StatusCode::CONFLICT,
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::TokenSigning(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::AuthRequired => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::BadRequest { code, .. } | Self::NotFound { code, .. } => *code,
            Self::Rejected(err) => ErrorCode::from(err),
            Self::Auth(err) => match err {
                AuthError::Validation(_) => ErrorCode::ValidationError,
                AuthError::InvalidCredentials => ErrorCode::InvalidCredentials,
                AuthError::InvalidToken => ErrorCode::InvalidToken,
                AuthError::EmailExists => ErrorCode::EmailExists,
                AuthError::Repository(_) | AuthError::PasswordHash | AuthError::TokenSigning(_) => {
                    ErrorCode::InternalError
                }
            },
            Self::AuthRequired => ErrorCode::AuthRequired,
            Self::RateLimited => ErrorCode::RateLimited,
            Self::PayloadTooLarge => ErrorCode::PayloadTooLarge,
            Self::Timeout => ErrorCode::RequestTimeout,
            Self::Database(_) => ErrorCode::PersistenceError,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Rejected(e) => Self::Rejected(e),
            OrderError::Repository(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let code = self.code();

        // Don't expose internal error details to clients
        let (message, errors) = match self {
            Self::Database(_) | Self::Internal(_) => ("Internal server error".to_owned(), None),
            Self::BadRequest {
                message, errors, ..
            } => (message, errors),
            Self::NotFound { message, .. } => (message, None),
            Self::Rejected(err) => (err.to_string(), None),
            Self::Auth(err) => match err {
                AuthError::Validation(problems) => {
                    ("Invalid input data".to_owned(), Some(problems))
                }
                AuthError::InvalidCredentials => ("Invalid email or password".to_owned(), None),
                AuthError::InvalidToken => ("Invalid or expired token".to_owned(), None),
                AuthError::EmailExists => ("Email already registered".to_owned(), None),
                _ => ("Internal server error".to_owned(), None),
            },
            Self::AuthRequired => ("Access token required".to_owned(), None),
            Self::RateLimited => ("Too many requests, please try again later".to_owned(), None),
            Self::PayloadTooLarge => ("Request body too large".to_owned(), None),
            Self::Timeout => ("Request timed out".to_owned(), None),
        };

        let body = ErrorBody {
            success: false,
            message,
            error: code,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Give bare 408/413 responses from the timeout and body-limit layers the
/// JSON error envelope. JSON responses pass through untouched.
pub async fn transport_error_envelope(response: Response) -> Response {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return response;
    }

    match response.status() {
        StatusCode::REQUEST_TIMEOUT => AppError::Timeout.into_response(),
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge.into_response(),
        _ => response,
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
