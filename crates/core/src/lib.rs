//! Enzi Coffee Core - Domain library for the point-of-sale backend.
//!
//! This crate provides the pieces of the system that carry real invariants:
//! - `types` - Newtype wrappers for IDs, emails, quantities, categories and money
//! - `menu` - The immutable menu catalog
//! - `order` - Reconciliation of client-proposed orders against the catalog
//! - `cart` - Client-side cart state that produces proposed orders
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. The `server` crate wires these into an axum API backed by
//! `PostgreSQL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod menu;
pub mod order;
pub mod types;

pub use cart::{Cart, CartLine};
pub use menu::{Catalog, CatalogError, MenuItem};
pub use order::{
    OrderLine, ProposedOrder, ProposedOrderLine, ReconcileError, ReconciledOrder, reconcile,
};
pub use types::*;
