//! Grocery store domain types.

use chrono::{DateTime, Utc};

use grocery_core::{StoreId, UserId};

/// A physical grocery store location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub id: StoreId,
    /// Store title (3-80 characters).
    pub title: String,
    /// Street address (10-120 characters).
    pub address: String,
    /// User who created the store. Never reassigned.
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating or updating a store.
///
/// Produced by `StoreForm::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInput {
    pub title: String,
    pub address: String,
}
