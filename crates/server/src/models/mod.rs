//! Domain models for the API.
//!
//! These are validated domain objects, separate from database row types.

pub mod order;
pub mod user;

pub use order::{DailySummary, NewOrder, Order, OrderView, Pagination};
pub use user::{Identity, NewUser, User};
