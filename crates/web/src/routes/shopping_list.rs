//! Shopping list handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use super::items::load_item;
use super::{Layout, Page};
use crate::error::AppError;
use crate::filters;
use crate::forms::ActionForm;
use crate::middleware::{CsrfForm, RequireAuth};
use crate::models::Item;
use crate::state::AppState;

/// The current user's shopping list.
#[derive(Template, WebTemplate)]
#[template(path = "shopping_list.html")]
pub struct ShoppingListTemplate {
    pub layout: Layout,
    pub items: Vec<Item>,
}

/// Append an item to the current user's list.
///
/// Unknown items are 404; adding the same item again adds another entry.
#[instrument(skip(state, page, user), fields(user_id = %user.id))]
pub async fn add_to_shopping_list(
    State(state): State<AppState>,
    page: Page,
    RequireAuth(user): RequireAuth,
    Path(raw_id): Path<String>,
    CsrfForm(_): CsrfForm<ActionForm>,
) -> Result<Response, AppError> {
    let item = load_item(&state, &raw_id).await?;
    state.db().add_to_shopping_list(user.id, item.id).await?;
    tracing::info!(item_id = %item.id, "Item added to shopping list");

    page.flash("Item added successfully").await?;
    Ok(Redirect::to(&format!("/item/{}", item.id)).into_response())
}

/// Show the current user's list in the order items were added.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn shopping_list(
    State(state): State<AppState>,
    page: Page,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let items = state.db().shopping_list(user.id).await?;

    Ok(ShoppingListTemplate {
        layout: page.layout().await?,
        items,
    }
    .into_response())
}
