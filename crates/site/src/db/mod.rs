//! Database operations for Tradepost.
//!
//! # Tables
//!
//! - `users` - Accounts and password hashes
//! - `categories` - Listing categories
//! - `listings` - Items for sale
//! - `cart_entries` - Per-user (listing, quantity) rows
//! - `purchases` / `purchase_items` - Immutable checkout records
//!
//! Sessions are stored by tower-sessions in its own table (created by the
//! session store itself at startup).
//!
//! # Migrations
//!
//! Migrations live in `crates/site/migrations/` and are embedded via
//! [`MIGRATOR`]. They run at startup, or explicitly via:
//! ```bash
//! cargo run -p tradepost-cli -- migrate
//! ```

pub mod cart;
pub mod catalog;
pub mod purchases;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use cart::CartRepository;
pub use catalog::CatalogRepository;
pub use purchases::PurchaseRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found (or not owned by the caller).
    #[error("not found")]
    NotFound,

    /// The caller is authenticated but not allowed to perform the operation.
    #[error("forbidden")]
    Forbidden,

    /// The operation is not valid, e.g. adding your own listing to the cart.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Checkout was attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The checkout transaction could not complete and was rolled back.
    #[error("checkout failed: {0}")]
    CheckoutFailed(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`),
///   e.g. `sqlite://tradepost.db`
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = database_url
        .expose_secret()
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for repository tests.

    use chrono::Utc;
    use sqlx::SqlitePool;

    use tradepost_core::{CategoryId, ListingId, Price, UserId};

    use super::MIGRATOR;

    /// Fresh in-memory database with the schema applied.
    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("connect in-memory sqlite");
        MIGRATOR.run(&pool).await.expect("run migrations");
        pool
    }

    /// Insert a user and return its id.
    pub async fn seed_user(pool: &SqlitePool, username: &str) -> UserId {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO users (username, email, password_hash, created_at)
             VALUES ($1, $2, 'x', $3) RETURNING id",
        )
        .bind(username)
        .bind(format!("{username}@example.com"))
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .expect("insert user");
        UserId::new(row.0)
    }

    /// Insert a category and return its id.
    pub async fn seed_category(pool: &SqlitePool, name: &str) -> CategoryId {
        let row: (i64,) = sqlx::query_as("INSERT INTO categories (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .expect("insert category");
        CategoryId::new(row.0)
    }

    /// Insert a listing and return its id.
    pub async fn seed_listing(
        pool: &SqlitePool,
        seller: UserId,
        category: CategoryId,
        title: &str,
        price: Price,
    ) -> ListingId {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO listings (seller_id, title, description, price_cents, category_id, created_at)
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(seller)
        .bind(title)
        .bind(format!("{title} description"))
        .bind(price)
        .bind(category)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .expect("insert listing");
        ListingId::new(row.0)
    }
}
