//! Catalog (listing) repository.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use tradepost_core::{ListingId, UserId};

use super::StoreError;
use crate::models::{Category, ListingFilter, ListingSummary, NewListing};

/// Columns selected for a [`ListingSummary`].
const SUMMARY_COLUMNS: &str = "l.id, l.seller_id, l.title, l.description, l.price_cents, \
     l.category_id, c.name AS category_name, u.username AS seller_name, \
     l.image_ref, l.created_at";

/// Repository for catalog database operations.
///
/// All mutations are seller-scoped: only the stored seller may update or
/// delete a listing.
pub struct CatalogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Find listings matching `filter`, newest first.
    ///
    /// Free-text search matches title or description; when a category (or
    /// seller) is also given, conditions combine with AND semantics.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn find(&self, filter: &ListingFilter) -> Result<Vec<ListingSummary>, StoreError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM listings l
             JOIN categories c ON l.category_id = c.id
             JOIN users u ON l.seller_id = u.id
             WHERE 1 = 1"
        ));

        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (l.title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR l.description LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(category) = filter.category {
            qb.push(" AND l.category_id = ").push_bind(category);
        }

        if let Some(seller) = filter.seller {
            qb.push(" AND l.seller_id = ").push_bind(seller);
        }

        qb.push(" ORDER BY l.created_at DESC, l.id DESC");

        let listings = qb
            .build_query_as::<ListingSummary>()
            .fetch_all(self.pool)
            .await?;

        Ok(listings)
    }

    /// Get a single listing with category and seller names.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn get(&self, id: ListingId) -> Result<Option<ListingSummary>, StoreError> {
        let listing = sqlx::query_as::<_, ListingSummary>(&format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM listings l
             JOIN categories c ON l.category_id = c.id
             JOIN users u ON l.seller_id = u.id
             WHERE l.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(listing)
    }

    /// Create a listing owned by `seller`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the insert fails (e.g. unknown
    /// category).
    pub async fn create(
        &self,
        seller: UserId,
        listing: &NewListing,
    ) -> Result<ListingId, StoreError> {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO listings
                 (seller_id, title, description, price_cents, category_id, image_ref, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(seller)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.category_id)
        .bind(&listing.image_ref)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await?;

        Ok(ListingId::new(row.0))
    }

    /// Update a listing. Only the stored seller may do this.
    ///
    /// When `listing.image_ref` is `None` the existing image reference is
    /// kept; replacing an image is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the listing doesn't exist,
    /// `StoreError::Forbidden` if `seller` is not the owner.
    pub async fn update(
        &self,
        seller: UserId,
        id: ListingId,
        listing: &NewListing,
    ) -> Result<(), StoreError> {
        self.check_owner(seller, id).await?;

        sqlx::query(
            "UPDATE listings
             SET title = $1, description = $2, price_cents = $3, category_id = $4,
                 image_ref = COALESCE($5, image_ref)
             WHERE id = $6",
        )
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.category_id)
        .bind(&listing.image_ref)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete a listing. Only the stored seller may do this.
    ///
    /// Returns the deleted listing's image reference so the caller can
    /// remove the file. Cart entries of other users referencing the listing
    /// are left in place; checkout detects them as stale.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the listing doesn't exist,
    /// `StoreError::Forbidden` if `seller` is not the owner.
    pub async fn delete(&self, seller: UserId, id: ListingId) -> Result<Option<String>, StoreError> {
        self.check_owner(seller, id).await?;

        let row: Option<(Option<String>,)> =
            sqlx::query_as("DELETE FROM listings WHERE id = $1 RETURNING image_ref")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        match row {
            Some((image_ref,)) => Ok(image_ref),
            None => Err(StoreError::NotFound),
        }
    }

    /// All categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(self.pool)
                .await?;

        Ok(categories)
    }

    /// NotFound if the listing doesn't exist, Forbidden if not owned by `seller`.
    async fn check_owner(&self, seller: UserId, id: ListingId) -> Result<(), StoreError> {
        let row: Option<(UserId,)> =
            sqlx::query_as("SELECT seller_id FROM listings WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        match row {
            None => Err(StoreError::NotFound),
            Some((owner,)) if owner != seller => Err(StoreError::Forbidden),
            Some(_) => Ok(()),
        }
    }
}
