//! Cart domain types.

use sqlx::FromRow;

use tradepost_core::{CartEntryId, ListingId, Price, UserId};

/// A cart entry joined with live listing data.
///
/// Prices here are *live* - they track listing edits until checkout
/// snapshots them.
#[derive(Debug, Clone, FromRow)]
pub struct CartItemWithListing {
    #[sqlx(rename = "id")]
    pub entry_id: CartEntryId,
    pub listing_id: ListingId,
    pub quantity: i64,
    pub title: String,
    #[sqlx(rename = "price_cents")]
    pub unit_price: Price,
    pub seller_id: UserId,
    pub seller_name: String,
    pub image_ref: Option<String>,
}

impl CartItemWithListing {
    /// Quantity times the live unit price.
    #[must_use]
    pub const fn line_total(&self) -> Price {
        self.unit_price.line_total(self.quantity)
    }
}
