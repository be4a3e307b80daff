//! Domain models for the marketplace.
//!
//! Each distinct query shape gets its own named type: a cart row joined with
//! live listing data is a [`cart::CartItemWithListing`], a purchase line
//! joined for display is a [`purchase::PurchaseItemDetail`], and so on. No
//! ad hoc row shapes cross module boundaries.

pub mod cart;
pub mod listing;
pub mod purchase;
pub mod session;
pub mod user;

pub use cart::CartItemWithListing;
pub use listing::{Category, ListingFilter, ListingSummary, NewListing};
pub use purchase::{PurchaseItemDetail, PurchaseSummary, PurchaseWithItems, SaleWithBuyer};
pub use session::{CurrentUser, Flash, FlashLevel, session_keys};
pub use user::User;
