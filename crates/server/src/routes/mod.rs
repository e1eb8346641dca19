//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Service banner
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Store reachability
//!
//! # Auth
//! POST /api/auth/register         - Create account, returns token
//! POST /api/auth/login            - Exchange credentials for token
//! GET  /api/auth/me               - Current user (bearer)
//! POST /api/auth/logout           - Stateless logout
//!
//! # Menu
//! GET  /api/menu                  - Available items
//! GET  /api/menu/available        - Available items
//! GET  /api/menu/categories       - Distinct categories
//! GET  /api/menu/category/{c}     - Items in a category
//! GET  /api/menu/item/{id}        - One item
//! GET  /api/menu/search?q=        - Name search
//!
//! # Orders (bearer)
//! POST /api/orders                - Place an order
//! GET  /api/orders?page&limit     - Paginated history
//! GET  /api/orders/daily          - Today's orders and totals
//! GET  /api/orders/{id}           - One order
//! ```

pub mod auth;
pub mod menu;
pub mod orders;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::config::ServerConfig;
use crate::middleware::{auth_rate_limiter, rate_limit_envelope};
use crate::state::AppState;

/// Success envelope: `{ success: true, message, data }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Response {
        Self::with_status(StatusCode::OK, message, data)
    }

    /// 201 Created with `data`.
    pub fn created(message: impl Into<String>, data: T) -> Response {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Response {
        let body = Self {
            success: true,
            message: message.into(),
            data,
        };
        (status, Json(body)).into_response()
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
}

/// Create the menu routes router.
pub fn menu_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(menu::index))
        .route("/available", get(menu::available))
        .route("/categories", get(menu::categories))
        .route("/category/{category}", get(menu::by_category))
        .route("/item/{id}", get(menu::show))
        .route("/search", get(menu::search))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::index))
        .route("/daily", get(orders::daily))
        .route("/{id}", get(orders::show))
}

/// Create all API routes, rate limiting the auth endpoints when configured.
pub fn routes(config: &ServerConfig) -> Router<AppState> {
    let mut auth = auth_routes();
    if config.auth_rate_limit {
        auth = auth
            .layer(auth_rate_limiter(config.trust_proxy_headers))
            .layer(axum::middleware::map_response(rate_limit_envelope));
    }

    Router::new()
        .nest("/api/auth", auth)
        .nest("/api/menu", menu_routes())
        .nest("/api/orders", order_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    //! Helpers for driving the router in unit tests.

    use axum::body::Body;
    use axum::http::{Request, header};
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    pub const TEST_SECRET: &str = "k8#Qz1!vR4@mW7$pL2^nX9&tB6*cY3%e";

    pub async fn app() -> (Router, AppState) {
        let config = ServerConfig::in_memory(SecretString::from(TEST_SECRET));
        let state = AppState::from_config(config).await.unwrap();
        (crate::build_router(state.clone()), state)
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Register a user and return their bearer token.
    pub async fn register(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "email": email,
                "password": "hunter22",
                "name": "Barista",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["token"].as_str().unwrap().to_owned()
    }
}
