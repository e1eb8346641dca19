//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login and bearer-token verification
//! - `orders` - Order reconciliation, persistence and daily summaries

pub mod auth;
pub mod orders;

pub use auth::{AuthError, AuthService};
pub use orders::{DayWindow, OrderError, OrderService};
