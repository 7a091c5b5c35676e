//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - All stores
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (storage reachable)
//!
//! # Auth
//! GET  /signup                    - Sign-up page
//! POST /signup                    - Create account
//! GET  /login                     - Login page (optional ?next=)
//! POST /login                     - Login action
//!
//! # Login required
//! GET  /logout                    - Logout action
//! GET  /new_store                 - New store form
//! POST /new_store                 - Create store
//! GET  /store/{id}                - Store detail and edit form
//! POST /store/{id}                - Update store
//! GET  /new_item                  - New item form
//! POST /new_item                  - Create item
//! GET  /item/{id}                 - Item detail and edit form
//! POST /item/{id}                 - Update item
//! POST /add_to_shopping_list/{id} - Append item to the user's list
//! GET  /shopping_list             - The user's list
//! ```

pub mod auth;
pub mod items;
pub mod layout;
pub mod shopping_list;
pub mod stores;

use std::str::FromStr;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
};

pub use layout::{Layout, Page};

use crate::error::AppError;
use crate::middleware::require_login;
use crate::state::AppState;

/// Routes anyone may use.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
}

/// Routes behind the login guard.
///
/// The guard is a `route_layer`, so it runs before extractors and only for
/// routes that matched.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", get(auth::logout))
        .route(
            "/new_store",
            get(stores::new_store_page).post(stores::create_store),
        )
        .route(
            "/store/{id}",
            get(stores::store_detail).post(stores::update_store),
        )
        .route("/new_item", get(items::new_item_page).post(items::create_item))
        .route("/item/{id}", get(items::item_detail).post(items::update_item))
        .route(
            "/add_to_shopping_list/{id}",
            post(shopping_list::add_to_shopping_list),
        )
        .route("/shopping_list", get(shopping_list::shopping_list))
        .route_layer(middleware::from_fn(require_login))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes())
}

/// Parse an id path segment; anything that is not an id is a missing record.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{what} {raw}")))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the storage backend is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.db().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocery_core::StoreId;

    use super::*;

    #[test]
    fn test_parse_id() {
        let id: StoreId = parse_id("12", "store").unwrap();
        assert_eq!(id, StoreId::new(12));
        assert!(matches!(
            parse_id::<StoreId>("twelve", "store"),
            Err(AppError::NotFound(_))
        ));
    }
}
