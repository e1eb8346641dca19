//! Subcommand implementations.

pub mod menu;
pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Database URL from `ENZI_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("ENZI_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
