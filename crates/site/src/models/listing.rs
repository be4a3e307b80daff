//! Listing (catalog) domain types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use tradepost_core::{CategoryId, ListingId, Price, UserId};

/// A listing joined with its category and seller names, for display.
///
/// Every read path wants the joined names, so this is the only listing row
/// shape; `image_ref` is an opaque reference to an uploaded image
/// (e.g. `/uploads/abc.jpg`).
#[derive(Debug, Clone, FromRow)]
pub struct ListingSummary {
    pub id: ListingId,
    pub seller_id: UserId,
    pub title: String,
    pub description: String,
    #[sqlx(rename = "price_cents")]
    pub price: Price,
    pub category_id: CategoryId,
    pub category_name: String,
    pub seller_name: String,
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A listing category.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Data for creating or updating a listing.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: Price,
    pub category_id: CategoryId,
    pub image_ref: Option<String>,
}

/// Catalog search filter. Conditions combine with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Free-text search over title and description.
    pub search: Option<String>,
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Restrict to one seller (dashboard view).
    pub seller: Option<UserId>,
}
