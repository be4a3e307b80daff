//! Purchase domain types.
//!
//! Purchases and their line items are immutable once written. Line items
//! snapshot the unit price and seller at checkout time, so history stays
//! stable when listings are later edited or deleted.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use tradepost_core::{ListingId, Price, PurchaseId, PurchaseItemId, UserId};

/// A purchase record.
#[derive(Debug, Clone, FromRow)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    #[sqlx(rename = "total_cents")]
    pub total: Price,
    pub created_at: DateTime<Utc>,
}

/// A purchase annotated with its line item count, for history lists.
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseSummary {
    pub id: PurchaseId,
    #[sqlx(rename = "total_cents")]
    pub total: Price,
    pub created_at: DateTime<Utc>,
    pub item_count: i64,
}

/// A purchase line item joined for display.
///
/// `title` and `image_ref` come from the live listing via LEFT JOIN and may
/// be gone if the listing was deleted; the snapshotted quantity, price, and
/// seller are authoritative.
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseItemDetail {
    pub id: PurchaseItemId,
    pub listing_id: ListingId,
    pub quantity: i64,
    #[sqlx(rename = "unit_price_cents")]
    pub unit_price: Price,
    pub seller_id: UserId,
    pub seller_name: String,
    pub title: Option<String>,
    pub image_ref: Option<String>,
}

impl PurchaseItemDetail {
    /// Quantity times the snapshotted unit price.
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.unit_price.line_total(self.quantity)
    }

    /// Listing title, or a placeholder when the listing no longer exists.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(listing removed)")
    }
}

/// A purchase together with its line items.
#[derive(Debug, Clone)]
pub struct PurchaseWithItems {
    pub purchase: Purchase,
    pub items: Vec<PurchaseItemDetail>,
}

/// A sold line item annotated with the buyer's name, for the seller view.
#[derive(Debug, Clone, FromRow)]
pub struct SaleWithBuyer {
    pub purchase_id: PurchaseId,
    pub listing_id: ListingId,
    pub quantity: i64,
    #[sqlx(rename = "unit_price_cents")]
    pub unit_price: Price,
    pub buyer_name: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SaleWithBuyer {
    /// Quantity times the snapshotted unit price.
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.unit_price.line_total(self.quantity)
    }

    /// Listing title, or a placeholder when the listing no longer exists.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(listing removed)")
    }
}
