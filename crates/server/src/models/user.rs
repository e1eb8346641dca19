//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use enzi_core::{Email, UserId};

/// A registered staff user (domain type).
///
/// The password hash is deliberately not part of this type; it only travels
/// between the user store and the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Lowercased email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The identity carried by requests authenticated as this user.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
}

/// Who is making an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: UserId,
    pub email: Email,
    pub name: String,
}
