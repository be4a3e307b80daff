//! Database seed command.
//!
//! Inserts the default categories plus a couple of demo accounts with
//! listings. Safe to run repeatedly: categories upsert by name and demo
//! accounts are skipped when they already exist.
//!
//! # Usage
//!
//! ```bash
//! tp-cli seed
//! tp-cli seed --categories-only
//! ```

use sqlx::SqlitePool;
use tracing::info;

use tradepost_core::{Price, PriceError, UserId};
use tradepost_site::db::{self, CatalogRepository, UserRepository};
use tradepost_site::models::{ListingFilter, NewListing};
use tradepost_site::services::auth::{AuthError, AuthService};

use super::migrate::{MigrationError, database_url};

const DEFAULT_CATEGORIES: [&str; 4] = ["Electronics", "Clothing", "Books", "Home"];

const DEMO_PASSWORD: &str = "demo-password";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store error: {0}")]
    Store(#[from] db::StoreError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("invalid demo price: {0}")]
    Price(#[from] PriceError),

    #[error("category missing after seeding: {0}")]
    MissingCategory(String),
}

/// Seed the database with default categories and demo data.
///
/// # Errors
///
/// Returns an error if the database is unreachable or inserts fail.
pub async fn run(categories_only: bool) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url)
        .await
        .map_err(MigrationError::from)?;
    db::MIGRATOR.run(&pool).await.map_err(MigrationError::from)?;

    seed_categories(&pool).await?;
    info!(count = DEFAULT_CATEGORIES.len(), "Categories seeded");

    if categories_only {
        return Ok(());
    }

    let alice = demo_user(&pool, "alice", "alice@tradepost.test").await?;
    let bob = demo_user(&pool, "bob", "bob@tradepost.test").await?;

    let created = seed_listings(&pool, alice, bob).await?;
    info!(listings = created, "Demo data seeded");
    info!("Demo accounts use the password \"{DEMO_PASSWORD}\"");

    Ok(())
}

async fn seed_categories(pool: &SqlitePool) -> Result<(), SeedError> {
    for name in DEFAULT_CATEGORIES {
        sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Register a demo user, or look them up when the email is already taken.
async fn demo_user(pool: &SqlitePool, username: &str, email: &str) -> Result<UserId, SeedError> {
    let auth = AuthService::new(pool);

    match auth.register(username, email, DEMO_PASSWORD).await {
        Ok(user) => {
            info!(%username, "Created demo user");
            Ok(user.id)
        }
        Err(AuthError::UserAlreadyExists) => {
            let parsed = tradepost_core::Email::parse(email).map_err(AuthError::from)?;
            let user = UserRepository::new(pool)
                .get_by_email(&parsed)
                .await?
                .ok_or(AuthError::UserNotFound)?;
            Ok(user.id)
        }
        Err(e) => Err(e.into()),
    }
}

async fn seed_listings(pool: &SqlitePool, alice: UserId, bob: UserId) -> Result<usize, SeedError> {
    let catalog = CatalogRepository::new(pool);

    let existing = catalog.find(&ListingFilter::default()).await?;
    if !existing.is_empty() {
        info!("Listings already present, skipping demo listings");
        return Ok(0);
    }

    let categories = catalog.categories().await?;
    let category = |name: &str| {
        categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .ok_or_else(|| SeedError::MissingCategory(name.to_owned()))
    };

    let demo: [(UserId, &str, &str, i64, &str); 4] = [
        (
            alice,
            "Wireless Headphones",
            "Over-ear headphones, lightly used.",
            5999,
            "Electronics",
        ),
        (
            alice,
            "Coffee Maker",
            "Drip coffee maker, 12 cups.",
            8999,
            "Home",
        ),
        (
            bob,
            "Denim Jacket",
            "Classic fit, size M.",
            4200,
            "Clothing",
        ),
        (
            bob,
            "Sci-Fi Novel",
            "Paperback in good condition.",
            1550,
            "Books",
        ),
    ];

    for &(seller, title, description, cents, category_name) in &demo {
        let listing = NewListing {
            title: title.to_owned(),
            description: description.to_owned(),
            price: Price::from_cents(cents)?,
            category_id: category(category_name)?,
            image_ref: None,
        };
        catalog.create(seller, &listing).await?;
    }

    Ok(demo.len())
}
