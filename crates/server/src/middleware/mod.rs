//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (record in span, echo on response)
//! 4. Security headers
//! 5. CORS
//! 6. Timeout and body limit
//! 7. Rate limiting on `/api/auth` (governor)
//!
//! Authentication is not a layer; protected handlers take [`RequireAuth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::RequireAuth;
pub use rate_limit::{auth_rate_limiter, rate_limit_envelope};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
