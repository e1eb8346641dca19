//! Persistence for users and orders.
//!
//! # Tables
//!
//! - `users` - Staff accounts (argon2id password hashes)
//! - `orders` - Accepted orders; line snapshots stored as `JSONB`
//!
//! Each table sits behind an async trait ([`UserStore`], [`OrderStore`]) with
//! a `PostgreSQL` implementation and an in-memory one ([`memory`]) used for
//! tests and local runs without a database.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p enzi-cli -- migrate
//! ```

pub mod memory;
pub mod orders;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use enzi_core::{Email, OrderId, UserId};

use crate::models::{NewOrder, NewUser, Order, User};

pub use memory::{MemoryOrderStore, MemoryUserStore};
pub use orders::PgOrderStore;
pub use users::PgUserStore;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation onto `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Storage for staff accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Look up a user by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up a user by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Look up a user together with their password hash, for login.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Storage for accepted orders. Orders are append-only.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order, assigning its id and timestamps.
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// One page of a user's orders, newest first, plus the user's total count.
    async fn list_by_owner(
        &self,
        owner: UserId,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, i64), RepositoryError>;

    /// A user's orders created within `[start, end]`, newest first.
    async fn list_by_owner_in_window(
        &self,
        owner: UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// Fetch an order only if it belongs to `owner`.
    async fn find_by_id_and_owner(
        &self,
        id: OrderId,
        owner: UserId,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Row offset for a 1-based page.
pub(crate) fn page_offset(page: u32, limit: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(limit)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(0, 10), 0);
    }
}
