//! Staff user management commands.
//!
//! # Usage
//!
//! ```bash
//! enzi-cli user create -e barista@enzi.coffee -n "Barista" -p 'long password'
//! ```
//!
//! # Environment Variables
//!
//! - `ENZI_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use enzi_core::UserId;
use enzi_server::db::PgUserStore;
use enzi_server::services::AuthError;
use enzi_server::services::auth::{RegisterInput, create_user};
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: ENZI_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Input was rejected or the user could not be stored.
    #[error("Could not create user: {0}")]
    Auth(#[from] AuthError),
}

/// Create a staff user with a password.
///
/// Applies the same validation as `POST /api/auth/register`.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError` if input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create(email: &str, name: &str, password: &str) -> Result<UserId, UserError> {
    let database_url = super::database_url().ok_or(UserError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = enzi_server::db::create_pool(&database_url).await?;
    let store = PgUserStore::new(pool);

    let user = create_user(
        &store,
        RegisterInput {
            email: email.to_owned(),
            password: password.to_owned(),
            name: name.to_owned(),
        },
    )
    .await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user.id)
}
