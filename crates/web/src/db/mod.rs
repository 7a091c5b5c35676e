//! Database operations for the grocery app.
//!
//! # Tables
//!
//! - `users` - Accounts with unique usernames and password digests
//! - `stores` - Grocery store locations
//! - `items` - Products, each belonging to exactly one store
//! - `shopping_list_items` - User/item associations (duplicates allowed)
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Repositories
//!
//! Each table group has a repository trait. [`PgDatabase`] implements all of
//! them on a `PostgreSQL` pool; [`MemoryDatabase`] implements them in process
//! and enforces the same constraints (unique usernames, store and item
//! references). Handlers only see `Arc<dyn Database>`.
//!
//! # Migrations
//!
//! Schema files live in `crates/web/migrations/` and are applied at startup.

pub mod items;
pub mod memory;
pub mod shopping_list;
pub mod stores;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use items::ItemRepository;
pub use memory::MemoryDatabase;
pub use shopping_list::ShoppingListRepository;
pub use stores::StoreRepository;
pub use users::UserRepository;

/// Database URL that selects the in-process repository.
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity (or an entity it references) was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// All repositories behind one handle.
#[async_trait]
pub trait Database:
    StoreRepository + ItemRepository + UserRepository + ShoppingListRepository + Send + Sync
{
    /// Check that the storage backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed implementation of every repository.
#[derive(Clone)]
pub struct PgDatabase {
    pool: PgPool,
}

impl PgDatabase {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the schema migrations shipped with this crate.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::migrate::MigrateError` if a migration fails.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Returns `true` if the URL selects the in-process repository.
#[must_use]
pub fn is_memory_url(database_url: &SecretString) -> bool {
    database_url.expose_secret() == MEMORY_DATABASE_URL
}

/// Create an empty in-process database handle.
#[must_use]
pub fn memory() -> Arc<dyn Database> {
    Arc::new(MemoryDatabase::new())
}

/// Map a failed write to the repository taxonomy.
///
/// Unique violations become `Conflict` with the given message; foreign key
/// violations mean a referenced row is missing and become `NotFound`.
fn map_write_error(error: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = error {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(error)
}
