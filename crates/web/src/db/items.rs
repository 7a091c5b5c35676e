//! Item repository.
//!
//! Every item read joins its store so callers get the store title without a
//! second query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use grocery_core::{ItemCategory, ItemId, PhotoUrl, Price, StoreId, UserId};

use super::{PgDatabase, RepositoryError, map_write_error};
use crate::models::{Item, ItemInput, StoreSummary};

/// Persistence operations for grocery items.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Items belonging to a store, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored item is invalid.
    async fn list_items_for_store(&self, store_id: StoreId) -> Result<Vec<Item>, RepositoryError>;

    /// Look up an item by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the stored item is invalid.
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;

    /// Insert an item owned by `created_by`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the referenced store or user
    /// does not exist.
    async fn create_item(&self, input: &ItemInput, created_by: UserId)
    -> Result<Item, RepositoryError>;

    /// Replace every editable field of an item. `created_by` is untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item or the referenced
    /// store does not exist.
    async fn update_item(&self, id: ItemId, input: &ItemInput) -> Result<Item, RepositoryError>;
}

/// Column list shared by every item query; expects `items` aliased as `i`
/// and `stores` aliased as `s`.
pub(super) const ITEM_COLUMNS: &str = "i.id, i.name, i.price, i.category, i.photo_url, \
     i.store_id, s.title AS store_title, i.created_by, i.created_at, i.updated_at";

#[derive(sqlx::FromRow)]
pub(super) struct ItemRow {
    id: ItemId,
    name: String,
    price: Decimal,
    category: ItemCategory,
    photo_url: String,
    store_id: StoreId,
    store_title: String,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for item {}: {e}", row.id))
        })?;
        let photo_url = PhotoUrl::parse(&row.photo_url).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid photo url for item {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            price,
            category: row.category,
            photo_url,
            store: StoreSummary {
                id: row.store_id,
                title: row.store_title,
            },
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl ItemRepository for PgDatabase {
    async fn list_items_for_store(&self, store_id: StoreId) -> Result<Vec<Item>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items i JOIN stores s ON s.id = i.store_id \
             WHERE i.store_id = $1 ORDER BY i.id"
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(store_id)
            .fetch_all(self.pool())
            .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items i JOIN stores s ON s.id = i.store_id \
             WHERE i.id = $1"
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.map(Item::try_from).transpose()
    }

    async fn create_item(
        &self,
        input: &ItemInput,
        created_by: UserId,
    ) -> Result<Item, RepositoryError> {
        let sql = format!(
            "WITH i AS ( \
                 INSERT INTO items (name, price, category, photo_url, store_id, created_by) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING * \
             ) \
             SELECT {ITEM_COLUMNS} FROM i JOIN stores s ON s.id = i.store_id"
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(&input.name)
            .bind(input.price.amount())
            .bind(input.category)
            .bind(&input.photo_url)
            .bind(input.store_id)
            .bind(created_by)
            .fetch_one(self.pool())
            .await
            .map_err(|e| map_write_error(e, "item already exists"))?;

        row.try_into()
    }

    async fn update_item(&self, id: ItemId, input: &ItemInput) -> Result<Item, RepositoryError> {
        let sql = format!(
            "WITH i AS ( \
                 UPDATE items \
                 SET name = $2, price = $3, category = $4, photo_url = $5, store_id = $6, \
                     updated_at = now() \
                 WHERE id = $1 \
                 RETURNING * \
             ) \
             SELECT {ITEM_COLUMNS} FROM i JOIN stores s ON s.id = i.store_id"
        );
        let row = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(id)
            .bind(&input.name)
            .bind(input.price.amount())
            .bind(input.category)
            .bind(&input.photo_url)
            .bind(input.store_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| map_write_error(e, "item already exists"))?;

        row.map(Item::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }
}
