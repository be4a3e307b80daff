//! User domain types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use tradepost_core::{Email, UserId};

/// A marketplace user.
///
/// The password hash never leaves the db layer; it is not part of this type.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name shown as seller/buyer.
    pub username: String,
    /// User's email address (unique, used for login).
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}
