//! Shopping list repository.
//!
//! A shopping list is a bag: adding the same item twice yields two entries.

use async_trait::async_trait;

use grocery_core::{ItemId, UserId};

use super::items::{ITEM_COLUMNS, ItemRow};
use super::{PgDatabase, RepositoryError, map_write_error};
use crate::models::Item;

/// Persistence operations for per-user shopping lists.
#[async_trait]
pub trait ShoppingListRepository: Send + Sync {
    /// Append an item to a user's list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or item does not exist.
    async fn add_to_shopping_list(&self, user: UserId, item: ItemId)
    -> Result<(), RepositoryError>;

    /// A user's list entries in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a listed item is invalid.
    async fn shopping_list(&self, user: UserId) -> Result<Vec<Item>, RepositoryError>;
}

#[async_trait]
impl ShoppingListRepository for PgDatabase {
    async fn add_to_shopping_list(
        &self,
        user: UserId,
        item: ItemId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO shopping_list_items (user_id, item_id) VALUES ($1, $2)")
            .bind(user)
            .bind(item)
            .execute(self.pool())
            .await
            .map_err(|e| map_write_error(e, "shopping list entry already exists"))?;

        Ok(())
    }

    async fn shopping_list(&self, user: UserId) -> Result<Vec<Item>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} \
             FROM shopping_list_items l \
             JOIN items i ON i.id = l.item_id \
             JOIN stores s ON s.id = i.store_id \
             WHERE l.user_id = $1 \
             ORDER BY l.id"
        );
        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(user)
            .fetch_all(self.pool())
            .await?;

        rows.into_iter().map(Item::try_from).collect()
    }
}
