//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::GroceryConfig;
use crate::db::Database;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the repository handle and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GroceryConfig,
    db: Arc<dyn Database>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration
    /// * `db` - Repository handle (`PostgreSQL` or in-memory)
    #[must_use]
    pub fn new(config: GroceryConfig, db: Arc<dyn Database>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, db }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &GroceryConfig {
        &self.inner.config
    }

    /// Get a reference to the repository handle.
    #[must_use]
    pub fn db(&self) -> &dyn Database {
        self.inner.db.as_ref()
    }
}
