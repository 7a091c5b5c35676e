//! Store repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use grocery_core::{StoreId, UserId};

use super::{PgDatabase, RepositoryError, map_write_error};
use crate::models::{Store, StoreInput};

/// Persistence operations for grocery stores.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// All stores in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn list_stores(&self) -> Result<Vec<Store>, RepositoryError>;

    /// Look up a store by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError>;

    /// Insert a store owned by `created_by`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the creating user does not exist.
    async fn create_store(
        &self,
        input: &StoreInput,
        created_by: UserId,
    ) -> Result<Store, RepositoryError>;

    /// Replace a store's title and address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    async fn update_store(&self, id: StoreId, input: &StoreInput)
    -> Result<Store, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    title: String,
    address: String,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            address: row.address,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl StoreRepository for PgDatabase {
    async fn list_stores(&self) -> Result<Vec<Store>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, title, address, created_by, created_at, updated_at
            FROM stores
            ORDER BY id
            ",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Store::from).collect())
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, title, address, created_by, created_at, updated_at
            FROM stores
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Store::from))
    }

    async fn create_store(
        &self,
        input: &StoreInput,
        created_by: UserId,
    ) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            INSERT INTO stores (title, address, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, title, address, created_by, created_at, updated_at
            ",
        )
        .bind(&input.title)
        .bind(&input.address)
        .bind(created_by)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_write_error(e, "store already exists"))?;

        Ok(row.into())
    }

    async fn update_store(
        &self,
        id: StoreId,
        input: &StoreInput,
    ) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            UPDATE stores
            SET title = $2, address = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, title, address, created_by, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.address)
        .fetch_optional(self.pool())
        .await?;

        row.map(Store::from).ok_or(RepositoryError::NotFound)
    }
}
