//! User model.

use chrono::{DateTime, Utc};

use pixel_den_core::{Email, UserId};

/// A registered storefront user.
#[derive(Debug, Clone)]
pub struct User {
    /// Database ID.
    pub id: UserId,
    /// Unique email address.
    pub email: Email,
    /// Display name shown in the UI.
    pub display_name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
