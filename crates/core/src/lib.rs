//! Pawtopia Core - Shared domain types and rules.
//!
//! This crate provides the types used across all Pawtopia components:
//! - `server` - REST API consumed by the Android and web clients
//! - `cli` - Command-line tools for migrations, admin accounts, and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The checkout arithmetic, appointment status
//! derivation, order status transitions, and the cart stock clamp live here so
//! every caller computes them the same way.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, usernames, and statuses
//! - [`pricing`] - Cart totals, shipping fee, stock clamping, and service prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::{
    CartLine, CartTotals, QuantityError, SHIPPING_FEE, average_rating, clamp_to_stock, line_total,
};
pub use types::*;
