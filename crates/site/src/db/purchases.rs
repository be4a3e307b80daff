//! Purchase repository: the checkout engine and read-only history queries.
//!
//! Checkout is the only multi-statement transaction in the application and
//! the only place prices and sellers are snapshotted. Everything downstream
//! (history, details, seller sales) reads the snapshot, so purchase records
//! are stable against later listing edits and deletion.

use chrono::Utc;
use sqlx::SqlitePool;

use tradepost_core::{ListingId, Price, PurchaseId, UserId};

use super::StoreError;
use crate::models::purchase::{
    Purchase, PurchaseItemDetail, PurchaseSummary, PurchaseWithItems, SaleWithBuyer,
};

/// One cart entry joined with the live listing data checkout snapshots.
#[derive(sqlx::FromRow)]
struct CheckoutLine {
    listing_id: ListingId,
    quantity: i64,
    #[sqlx(rename = "price_cents")]
    unit_price: Price,
    seller_id: UserId,
}

/// Repository for purchase database operations.
pub struct PurchaseRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert the user's cart into a purchase, atomically.
    ///
    /// Within one transaction: read the cart joined with live prices and
    /// sellers, insert a purchase with the computed total, insert one line
    /// item per entry (snapshotting quantity, unit price, and seller), and
    /// delete the user's cart entries. Either all four effects persist or
    /// none do.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::EmptyCart` if the user has no cart entries; no
    /// state is created. Returns `StoreError::CheckoutFailed` (after
    /// rollback) if any entry's listing has been deleted since it was added
    /// to the cart - the stale entries are left in place for the user to
    /// remove. The caller may retry; there is no automatic retry.
    pub async fn checkout(&self, user: UserId) -> Result<PurchaseId, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (entry_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cart_entries WHERE user_id = $1")
                .bind(user)
                .fetch_one(&mut *tx)
                .await?;

        if entry_count == 0 {
            // Dropping the transaction rolls it back; nothing was written.
            return Err(StoreError::EmptyCart);
        }

        let lines = sqlx::query_as::<_, CheckoutLine>(
            "SELECT ce.listing_id, ce.quantity, l.price_cents, l.seller_id
             FROM cart_entries ce
             JOIN listings l ON ce.listing_id = l.id
             WHERE ce.user_id = $1
             ORDER BY ce.id",
        )
        .bind(user)
        .fetch_all(&mut *tx)
        .await?;

        // An entry whose listing was deleted between add-to-cart and now
        // drops out of the join. Fail the whole checkout rather than
        // silently buying less than the cart showed.
        let joined = i64::try_from(lines.len()).unwrap_or(i64::MAX);
        if joined != entry_count {
            return Err(StoreError::CheckoutFailed(
                "a listing in the cart no longer exists".to_owned(),
            ));
        }

        let total = lines.iter().fold(Price::ZERO, |acc, line| {
            acc.saturating_add(line.unit_price.line_total(line.quantity))
        });
        let now = Utc::now();

        let (purchase_id,): (i64,) = sqlx::query_as(
            "INSERT INTO purchases (user_id, total_cents, created_at)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(user)
        .bind(total)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                "INSERT INTO purchase_items
                     (purchase_id, listing_id, quantity, unit_price_cents, seller_id, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(purchase_id)
            .bind(line.listing_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.seller_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_entries WHERE user_id = $1")
            .bind(user)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(PurchaseId::new(purchase_id))
    }

    /// The user's purchases, newest first, each with its line item count.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn history(&self, user: UserId) -> Result<Vec<PurchaseSummary>, StoreError> {
        let purchases = sqlx::query_as::<_, PurchaseSummary>(
            "SELECT p.id, p.total_cents, p.created_at, COUNT(pi.id) AS item_count
             FROM purchases p
             JOIN purchase_items pi ON p.id = pi.purchase_id
             WHERE p.user_id = $1
             GROUP BY p.id
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(purchases)
    }

    /// A purchase with its line items, only if it belongs to `user`.
    ///
    /// Line items are display-joined with the current listing title and
    /// image (LEFT JOIN - the listing may be gone) and the snapshotted
    /// seller's username. The join never alters the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the purchase does not exist or
    /// belongs to another user.
    pub async fn details(
        &self,
        purchase: PurchaseId,
        user: UserId,
    ) -> Result<PurchaseWithItems, StoreError> {
        let record = sqlx::query_as::<_, Purchase>(
            "SELECT id, user_id, total_cents, created_at
             FROM purchases
             WHERE id = $1 AND user_id = $2",
        )
        .bind(purchase)
        .bind(user)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        let items = sqlx::query_as::<_, PurchaseItemDetail>(
            "SELECT pi.id, pi.listing_id, pi.quantity, pi.unit_price_cents,
                    pi.seller_id, u.username AS seller_name, l.title, l.image_ref
             FROM purchase_items pi
             JOIN users u ON pi.seller_id = u.id
             LEFT JOIN listings l ON pi.listing_id = l.id
             WHERE pi.purchase_id = $1
             ORDER BY pi.id",
        )
        .bind(purchase)
        .fetch_all(self.pool)
        .await?;

        Ok(PurchaseWithItems {
            purchase: record,
            items,
        })
    }

    /// All line items sold by `seller` (per the snapshotted seller field),
    /// newest first, annotated with the buyer's username.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the query fails.
    pub async fn seller_sales(&self, seller: UserId) -> Result<Vec<SaleWithBuyer>, StoreError> {
        let sales = sqlx::query_as::<_, SaleWithBuyer>(
            "SELECT pi.purchase_id, pi.listing_id, pi.quantity, pi.unit_price_cents,
                    b.username AS buyer_name, l.title, pi.created_at
             FROM purchase_items pi
             JOIN purchases p ON pi.purchase_id = p.id
             JOIN users b ON p.user_id = b.id
             LEFT JOIN listings l ON pi.listing_id = l.id
             WHERE pi.seller_id = $1
             ORDER BY pi.created_at DESC, pi.id DESC",
        )
        .bind(seller)
        .fetch_all(self.pool)
        .await?;

        Ok(sales)
    }
}
