//! Core types for Enzi Coffee.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod money;
pub mod quantity;

pub use category::{Category, CategoryError};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{TOTAL_TOLERANCE, format_usd, line_total, within_tolerance};
pub use quantity::{Quantity, QuantityError};
