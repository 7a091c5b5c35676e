//! User domain types.

use chrono::{DateTime, Utc};

use grocery_core::UserId;

/// A registered user.
///
/// The password digest is never part of this type; it is only read through
/// `UserRepository::get_password_hash` during login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique username.
    pub username: String,
    /// When the user signed up.
    pub created_at: DateTime<Utc>,
}
