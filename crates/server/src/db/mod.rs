//! Database operations for the Pawtopia `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` / `admins` - Customer and admin accounts (Argon2 password hashes)
//! - `addresses` - One shipping address per customer
//! - `products` - Catalog with stock (`quantity`) and `quantity_sold`
//! - `carts` / `cart_items` - One cart per customer, keyed by the customer's ID
//! - `orders` / `order_items` - Placed orders with price snapshots
//! - `reviews` - One review per customer per product
//! - `appointments` - Grooming and boarding bookings
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p pawtopia-cli -- migrate
//! ```
//!
//! Queries use runtime-checked `sqlx::query_as` with `FromRow` row types so
//! the crate builds without a live database.

pub mod addresses;
pub mod admins;
pub mod appointments;
pub mod carts;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use admins::AdminRepository;
pub use appointments::AppointmentRepository;
pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
///
/// `messages` pairs constraint names with the client-facing message for each;
/// a violation of an unlisted constraint uses `fallback`.
pub(crate) fn map_unique_violation(
    err: sqlx::Error,
    messages: &[(&str, &str)],
    fallback: &str,
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        let message = db_err
            .constraint()
            .and_then(|name| messages.iter().find(|(c, _)| *c == name))
            .map_or(fallback, |(_, msg)| *msg);
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
