//! Grocery item domain types.

use chrono::{DateTime, Utc};

use grocery_core::{ItemCategory, ItemId, PhotoUrl, Price, StoreId, UserId};

/// A product sold at exactly one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// Item name (3-80 characters).
    pub name: String,
    pub price: Price,
    pub category: ItemCategory,
    pub photo_url: PhotoUrl,
    /// The store this item is located in.
    pub store: StoreSummary,
    /// User who created the item. Never reassigned.
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The parts of a store shown alongside an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub id: StoreId,
    pub title: String,
}

/// Validated input for creating or updating an item.
///
/// Produced by `ItemForm::validate`, which has already checked that
/// `store_id` refers to an existing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInput {
    pub name: String,
    pub price: Price,
    pub category: ItemCategory,
    pub photo_url: PhotoUrl,
    pub store_id: StoreId,
}
