//! Cart repository.
//!
//! One row per (user, listing); repeated adds merge additively. Rows join
//! against live listing data, so displayed prices track listing edits until
//! checkout snapshots them.

use chrono::Utc;
use sqlx::SqlitePool;

use tradepost_core::{CartEntryId, ListingId, Price, UserId};

use super::StoreError;
use crate::models::CartItemWithListing;

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add `quantity` of a listing to the user's cart.
    ///
    /// If the listing is already in the cart, the quantity is incremented.
    /// There is no upper bound on quantity.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidOperation` if the listing does not exist,
    /// if the user is its seller, or if `quantity` is not positive.
    pub async fn add_item(
        &self,
        user: UserId,
        listing: ListingId,
        quantity: i64,
    ) -> Result<(), StoreError> {
        if quantity < 1 {
            return Err(StoreError::InvalidOperation(
                "quantity must be positive".to_owned(),
            ));
        }

        let row: Option<(UserId,)> =
            sqlx::query_as("SELECT seller_id FROM listings WHERE id = $1")
                .bind(listing)
                .fetch_optional(self.pool)
                .await?;

        let seller = match row {
            None => {
                return Err(StoreError::InvalidOperation(
                    "listing not found".to_owned(),
                ));
            }
            Some((seller,)) => seller,
        };

        if seller == user {
            return Err(StoreError::InvalidOperation(
                "you cannot add your own listing to the cart".to_owned(),
            ));
        }

        sqlx::query(
            "INSERT INTO cart_entries (user_id, listing_id, quantity, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, listing_id)
             DO UPDATE SET quantity = quantity + excluded.quantity",
        )
        .bind(user)
        .bind(listing)
        .bind(quantity)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set an entry's quantity. A quantity of zero or less removes the entry.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the entry does not belong to `user`.
    pub async fn set_quantity(
        &self,
        user: UserId,
        entry: CartEntryId,
        quantity: i64,
    ) -> Result<(), StoreError> {
        if quantity <= 0 {
            return self.remove_item(user, entry).await;
        }

        let result = sqlx::query("UPDATE cart_entries SET quantity = $1 WHERE id = $2 AND user_id = $3")
            .bind(quantity)
            .bind(entry)
            .bind(user)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    /// Remove an entry from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the entry does not belong to `user`.
    pub async fn remove_item(&self, user: UserId, entry: CartEntryId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM cart_entries WHERE id = $1 AND user_id = $2")
            .bind(entry)
            .bind(user)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    /// Remove all of the user's cart entries. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn clear(&self, user: UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cart_entries WHERE user_id = $1")
            .bind(user)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// The user's cart entries joined with live listing data.
    ///
    /// Entries whose listing has been deleted do not appear here (the join
    /// drops them); checkout rejects them explicitly instead.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn items(&self, user: UserId) -> Result<Vec<CartItemWithListing>, StoreError> {
        let items = sqlx::query_as::<_, CartItemWithListing>(
            "SELECT ce.id, ce.listing_id, ce.quantity, l.title, l.price_cents,
                    l.seller_id, u.username AS seller_name, l.image_ref
             FROM cart_entries ce
             JOIN listings l ON ce.listing_id = l.id
             JOIN users u ON l.seller_id = u.id
             WHERE ce.user_id = $1
             ORDER BY ce.id",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Sum of quantity times live price over the user's cart.
    ///
    /// Returns zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn total(&self, user: UserId) -> Result<Price, StoreError> {
        let (cents,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(ce.quantity * l.price_cents), 0)
             FROM cart_entries ce
             JOIN listings l ON ce.listing_id = l.id
             WHERE ce.user_id = $1",
        )
        .bind(user)
        .fetch_one(self.pool)
        .await?;

        Price::from_cents(cents)
            .map_err(|e| StoreError::DataCorruption(format!("negative cart total: {e}")))
    }
}
