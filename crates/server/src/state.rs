//! Application state shared across handlers.

use std::sync::Arc;

use enzi_core::Catalog;

use crate::config::{ServerConfig, StoreBackend};
use crate::db::{self, MemoryOrderStore, MemoryUserStore, OrderStore, PgOrderStore, PgUserStore, UserStore};
use crate::services::{AuthService, OrderService};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("postgres store selected but no database URL configured")]
    MissingDatabaseUrl,
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The catalog is immutable and
/// shared without locks; only the stores hold mutable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    catalog: Arc<Catalog>,
    auth: AuthService,
    orders: OrderService,
}

impl AppState {
    /// Assemble state from already-constructed stores.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        catalog: Catalog,
        users: Arc<dyn UserStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let auth = AuthService::new(users, &config.jwt_secret, config.token_ttl_hours);
        let orders = OrderService::new(Arc::clone(&catalog), orders);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                auth,
                orders,
            }),
        }
    }

    /// Build state with the store backend named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the `PostgreSQL` pool cannot be created.
    pub async fn from_config(config: ServerConfig) -> Result<Self, StateError> {
        let (users, orders): (Arc<dyn UserStore>, Arc<dyn OrderStore>) = match config.store {
            StoreBackend::Postgres => {
                let url = config
                    .database_url
                    .as_ref()
                    .ok_or(StateError::MissingDatabaseUrl)?;
                let pool = db::create_pool(url).await?;
                tracing::info!("Database pool created");
                (
                    Arc::new(PgUserStore::new(pool.clone())),
                    Arc::new(PgOrderStore::new(pool)),
                )
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory stores; data will not survive a restart");
                (
                    Arc::new(MemoryUserStore::new()),
                    Arc::new(MemoryOrderStore::new()),
                )
            }
        };

        Ok(Self::new(config, Catalog::builtin(), users, orders))
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the menu catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }
}
