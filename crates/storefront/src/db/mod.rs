//! Database operations for the storefront `SQLite` database.
//!
//! ## Tables
//!
//! - `users` - Site authentication (email, argon2 password hash, display name)
//! - `products` - Catalog seed data (price, image, Stripe price id)
//! - `cart_items` - One row per (user, product) with an explicit quantity
//! - `orders` - Append-only purchase line items, grouped by `reference`
//! - `checkout_sessions` - In-flight hosted-checkout to user associations
//! - `tower_sessions` - Session storage (created by the session store itself)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p pixel-den-cli -- migrate
//! ```
//!
//! Foreign keys are declared for documentation but the `foreign_keys` pragma
//! is left off: a product deleted out-of-band must surface as a
//! [`RepositoryError::StaleReference`] when a cart or order row still points
//! at it, not fail at delete time.

pub mod cart;
pub mod checkout_sessions;
pub mod orders;
pub mod products;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

use pixel_den_core::ProductId;

pub use cart::CartRepository;
pub use checkout_sessions::CheckoutSessionRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Embedded migrations from `crates/storefront/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

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

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A cart or order row references a product that no longer exists.
    #[error("stale reference to product {0}")]
    StaleReference(ProductId),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(false);

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
