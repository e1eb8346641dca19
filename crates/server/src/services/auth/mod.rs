//! Authentication service.
//!
//! Password accounts with argon2id hashes and stateless HS256 bearer tokens.
//! A token is only honoured while the user it names still exists.

mod error;

pub use error::AuthError;

use std::sync::{Arc, LazyLock};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use enzi_core::{Email, UserId};

use crate::db::{RepositoryError, UserStore};
use crate::models::{Identity, NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;
/// Display name length bounds, after trimming.
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;

/// Hash verified against when the email is unknown, so both login failures
/// cost one argon2 verification.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("enzi-unknown-account").ok());

/// Registration input as received from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Login input as received from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// JWT claims carried by bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    name: String,
    iat: i64,
    exp: i64,
}

/// A freshly authenticated user and the token issued to them.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Authentication service.
///
/// Handles registration, login and bearer-token verification.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: &SecretString, token_ttl_hours: u32) -> Self {
        let secret = jwt_secret.expose_secret().as_bytes();
        Self {
            users,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl: Duration::hours(i64::from(token_ttl_hours)),
        }
    }

    /// The user store this service authenticates against.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Register a new user and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` listing every invalid field.
    /// Returns `AuthError::EmailExists` if the email is already registered.
    pub async fn register(&self, input: RegisterInput) -> Result<Session, AuthError> {
        let user = create_user(self.users.as_ref(), input).await?;
        let token = self.issue_token(&user)?;
        Ok(Session { user, token })
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the input is malformed.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, input: LoginInput) -> Result<Session, AuthError> {
        let mut problems = Vec::new();
        let email = Email::parse(&input.email)
            .map_err(|_| problems.push("Invalid email address".to_owned()))
            .ok();
        if input.password.is_empty() {
            problems.push("Password is required".to_owned());
        }
        let Some(email) = email.filter(|_| problems.is_empty()) else {
            return Err(AuthError::Validation(problems));
        };

        let Some((user, password_hash)) = self.users.find_credentials(&email).await? else {
            if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
                let _ = verify_password(&input.password, dummy);
            }
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(&input.password, &password_hash)?;

        tracing::info!(user_id = %user.id, "User logged in");
        let token = self.issue_token(&user)?;
        Ok(Session { user, token })
    }

    // =========================================================================
    // Bearer Tokens
    // =========================================================================

    /// Sign a token for `user`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            name: user.name.clone(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::TokenSigning)
    }

    /// Resolve a bearer token to the identity of a still-existing user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for bad, expired or orphaned tokens.
    /// Returns `AuthError::Repository` if the user lookup fails.
    pub async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AuthError::InvalidToken
        })?
        .claims;

        let user_id: UserId = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(user.identity())
    }
}

/// Validate registration input, hash the password and store the user.
///
/// # Errors
///
/// Returns `AuthError::Validation` listing every invalid field.
/// Returns `AuthError::EmailExists` if the email is already registered.
pub async fn create_user(users: &dyn UserStore, input: RegisterInput) -> Result<User, AuthError> {
    let mut problems = Vec::new();

    let email = Email::parse(&input.email)
        .map_err(|_| problems.push("Invalid email address".to_owned()))
        .ok();
    if let Err(message) = validate_password(&input.password) {
        problems.push(message);
    }
    let name = input.name.trim().to_owned();
    if let Err(message) = validate_name(&name) {
        problems.push(message);
    }

    let Some(email) = email.filter(|_| problems.is_empty()) else {
        return Err(AuthError::Validation(problems));
    };

    let password_hash = hash_password(&input.password)?;

    let user = users
        .create(NewUser {
            email,
            name,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailExists,
            other => AuthError::Repository(other),
        })?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a trimmed display name.
fn validate_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if len < MIN_NAME_LENGTH {
        return Err(format!("Name must be at least {MIN_NAME_LENGTH} characters"));
    }
    if len > MAX_NAME_LENGTH {
        return Err("Name too long".to_owned());
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;

    const SECRET: &str = "k3J9#vQ2!pL8@xR5$wT1^mN7&bC4*zF6";

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryUserStore::new()),
            &SecretString::from(SECRET),
            24,
        )
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_owned(),
            password: "hunter22".to_owned(),
            name: "Ada Barista".to_owned(),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("flat-white").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("flat-white", &hash).is_ok());
        assert!(matches!(
            verify_password("cortado", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_dummy_hash_matches_real_cost() {
        let dummy = DUMMY_PASSWORD_HASH.as_deref().unwrap();
        let dummy = PasswordHash::new(dummy).unwrap();
        let real = hash_password("flat-white").unwrap();
        let real = PasswordHash::new(&real).unwrap();

        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.params, real.params);
        assert!(matches!(
            verify_password("hunter22", &dummy.to_string()),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_name_bounds() {
        assert!(validate_name("A").is_err());
        assert!(validate_name("Al").is_ok());
        assert!(validate_name(&"x".repeat(50)).is_ok());
        assert!(validate_name(&"x".repeat(51)).is_err());
    }

    #[tokio::test]
    async fn test_register_then_verify_token() {
        let auth = service();
        let session = auth.register(register_input("Ada@Enzi.Coffee")).await.unwrap();

        assert_eq!(session.user.email.as_str(), "ada@enzi.coffee");
        let identity = auth.verify(&session.token).await.unwrap();
        assert_eq!(identity.id, session.user.id);
        assert_eq!(identity.name, "Ada Barista");
    }

    #[tokio::test]
    async fn test_register_collects_all_problems() {
        let auth = service();
        let err = auth
            .register(RegisterInput {
                email: "nope".to_owned(),
                password: "123".to_owned(),
                name: " A ".to_owned(),
            })
            .await
            .unwrap_err();

        let AuthError::Validation(problems) = err else {
            panic!("expected validation error");
        };
        assert_eq!(problems.len(), 3);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let auth = service();
        auth.register(register_input("ada@enzi.coffee")).await.unwrap();
        let err = auth
            .register(register_input("ADA@enzi.coffee"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailExists));
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_the_same() {
        let auth = service();
        auth.register(register_input("ada@enzi.coffee")).await.unwrap();

        let wrong_password = auth
            .login(LoginInput {
                email: "ada@enzi.coffee".to_owned(),
                password: "not-it".to_owned(),
            })
            .await
            .unwrap_err();
        let unknown = auth
            .login(LoginInput {
                email: "ghost@enzi.coffee".to_owned(),
                password: "hunter22".to_owned(),
            })
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_success() {
        let auth = service();
        let registered = auth.register(register_input("ada@enzi.coffee")).await.unwrap();
        let session = auth
            .login(LoginInput {
                email: " ADA@enzi.coffee ".to_owned(),
                password: "hunter22".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_verify_rejects_foreign_signature() {
        let auth = service();
        let session = auth.register(register_input("ada@enzi.coffee")).await.unwrap();

        let other = AuthService::new(
            Arc::new(MemoryUserStore::new()),
            &SecretString::from("Zq8!rW2#tY6$uI0%oP4^aS9&dF3*gH7j"),
            24,
        );
        assert!(matches!(
            other.verify(&session.token).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            auth.verify("not.a.jwt").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_expired_token() {
        let auth = service();
        let session = auth.register(register_input("ada@enzi.coffee")).await.unwrap();

        let past = Utc::now() - Duration::hours(48);
        let claims = Claims {
            sub: session.user.id.to_string(),
            email: session.user.email.to_string(),
            name: session.user.name.clone(),
            iat: past.timestamp(),
            exp: (past + Duration::hours(24)).timestamp(),
        };
        let expired = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            auth.verify(&expired).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_token_for_missing_user() {
        let auth = service();
        let now = Utc::now();
        let ghost = User {
            id: UserId::generate(),
            email: Email::parse("ghost@enzi.coffee").unwrap(),
            name: "Ghost".to_owned(),
            created_at: now,
            updated_at: now,
        };
        let token = auth.issue_token(&ghost).unwrap();
        assert!(matches!(
            auth.verify(&token).await,
            Err(AuthError::InvalidToken)
        ));
    }
}
