//! Integration tests for the Enzi Coffee API.
//!
//! Each test spawns the real router on an ephemeral port with in-memory
//! stores and talks to it over HTTP.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p enzi-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};

use enzi_core::Catalog;
use enzi_server::config::ServerConfig;
use enzi_server::db::{MemoryOrderStore, MemoryUserStore};
use enzi_server::state::AppState;

/// High-entropy signing secret used only by tests.
const TEST_JWT_SECRET: &str = "Zt7#qW2!eR9@yU4$iO1^pA6&sD3*fG8%";

/// Errors raised while bringing up a test server.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("bind failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("state init failed: {0}")]
    State(#[from] enzi_server::state::StateError),
}

/// A running server plus an HTTP client pointed at it.
pub struct TestContext {
    pub client: Client,
    pub addr: SocketAddr,
    pub state: AppState,
}

/// Response status and decoded JSON body.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

/// In-memory configuration on `127.0.0.1:0` with rate limiting off.
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig::in_memory(SecretString::from(TEST_JWT_SECRET))
}

impl TestContext {
    /// Start a server with in-memory stores on `127.0.0.1:0`.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the listener cannot be bound.
    pub async fn spawn() -> Result<Self, SpawnError> {
        Self::spawn_with(test_config()).await
    }

    /// Start a server with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the listener cannot be bound or the state
    /// cannot be built.
    pub async fn spawn_with(config: ServerConfig) -> Result<Self, SpawnError> {
        let addr = config.socket_addr();
        let state = AppState::from_config(config).await?;
        Self::start(addr, state).await
    }

    /// Start an in-memory server over a custom catalog.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the listener cannot be bound.
    pub async fn spawn_with_catalog(catalog: Catalog) -> Result<Self, SpawnError> {
        let config = test_config();
        let addr = config.socket_addr();
        let state = AppState::new(
            config,
            catalog,
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryOrderStore::new()),
        );
        Self::start(addr, state).await
    }

    async fn start(addr: SocketAddr, state: AppState) -> Result<Self, SpawnError> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        let served = state.clone();
        tokio::spawn(async move {
            let _ = enzi_server::serve(listener, served, std::future::pending()).await;
        });

        Ok(Self {
            client: Client::new(),
            addr,
            state,
        })
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Send a request and decode the JSON reply (`Null` for non-JSON bodies).
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the request cannot be sent.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Reply, reqwest::Error> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(Reply { status, body })
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the request cannot be sent.
    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<Reply, reqwest::Error> {
        self.send(Method::GET, path, token, None).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the request cannot be sent.
    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<Reply, reqwest::Error> {
        self.send(Method::POST, path, token, Some(body)).await
    }

    /// Register `email` with a fixed password and return the issued token,
    /// or `None` if registration was refused.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the request cannot be sent.
    pub async fn register(&self, email: &str) -> Result<Option<String>, reqwest::Error> {
        let reply = self
            .post(
                "/api/auth/register",
                None,
                &json!({ "email": email, "password": "hunter22", "name": "Barista" }),
            )
            .await?;
        Ok(reply.body["data"]["token"].as_str().map(str::to_owned))
    }
}

/// Order body for `lines` of `(id, quantity, name, price)`.
#[must_use]
pub fn order_body(lines: &[(i64, i64, &str, f64)], total: f64, item_count: i64) -> Value {
    let items: Vec<Value> = lines
        .iter()
        .map(|(id, quantity, name, price)| {
            json!({ "id": id, "quantity": quantity, "name": name, "price": price })
        })
        .collect();
    json!({ "items": items, "totalAmount": total, "itemCount": item_count })
}
