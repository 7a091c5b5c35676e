//! Item creation and detail/edit handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use grocery_core::{ItemCategory, ItemId};

use super::{Layout, Page, parse_id};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::forms::{FormErrors, ItemForm};
use crate::middleware::{CsrfForm, RequireAuth};
use crate::models::{Item, Store};
use crate::state::AppState;

/// `(value, label)` pairs for the category select control.
type CategoryChoices = [(&'static str, &'static str); 6];

// =============================================================================
// Templates
// =============================================================================

/// New item form.
#[derive(Template, WebTemplate)]
#[template(path = "new_item.html")]
pub struct NewItemTemplate {
    pub layout: Layout,
    pub form: ItemForm,
    pub errors: FormErrors,
    pub stores: Vec<Store>,
    pub categories: CategoryChoices,
}

/// Item detail with an edit form and an add-to-list button.
#[derive(Template, WebTemplate)]
#[template(path = "item_detail.html")]
pub struct ItemDetailTemplate {
    pub layout: Layout,
    pub item: Item,
    pub form: ItemForm,
    pub errors: FormErrors,
    pub stores: Vec<Store>,
    pub categories: CategoryChoices,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display an empty new item form.
pub async fn new_item_page(
    State(state): State<AppState>,
    page: Page,
) -> Result<Response, AppError> {
    let stores = state.db().list_stores().await?;
    render_new(&page, ItemForm::default(), FormErrors::new(), stores).await
}

/// Handle new item submission.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_item(
    State(state): State<AppState>,
    page: Page,
    RequireAuth(user): RequireAuth,
    CsrfForm(form): CsrfForm<ItemForm>,
) -> Result<Response, AppError> {
    let stores = state.db().list_stores().await?;
    let input = match form.validate(&stores) {
        Ok(input) => input,
        Err(errors) => return render_new(&page, form, errors, stores).await,
    };

    let item = state.db().create_item(&input, user.id).await?;
    tracing::info!(item_id = %item.id, store_id = %item.store.id, "Item created");
    let item_id = item.id.to_string();
    add_breadcrumb("inventory", "Created item", Some(&[("item_id", item_id.as_str())]));

    page.flash("New item created!").await?;
    Ok(Redirect::to(&format!("/item/{}", item.id)).into_response())
}

/// Display an item and the pre-filled edit form.
#[instrument(skip(state, page))]
pub async fn item_detail(
    State(state): State<AppState>,
    page: Page,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let item = load_item(&state, &raw_id).await?;
    let stores = state.db().list_stores().await?;
    let form = ItemForm::from_item(&item);

    render_detail(&page, item, form, FormErrors::new(), stores).await
}

/// Handle item edit submission.
#[instrument(skip(state, page, form))]
pub async fn update_item(
    State(state): State<AppState>,
    page: Page,
    Path(raw_id): Path<String>,
    CsrfForm(form): CsrfForm<ItemForm>,
) -> Result<Response, AppError> {
    let item = load_item(&state, &raw_id).await?;
    let stores = state.db().list_stores().await?;

    let input = match form.validate(&stores) {
        Ok(input) => input,
        Err(errors) => return render_detail(&page, item, form, errors, stores).await,
    };

    let item = state.db().update_item(item.id, &input).await?;
    tracing::info!(item_id = %item.id, "Item updated");

    page.flash("Item details were changed!").await?;
    Ok(Redirect::to(&format!("/item/{}", item.id)).into_response())
}

// =============================================================================
// Helpers
// =============================================================================

/// Look up an item from a raw path segment; unknown or malformed ids are 404.
pub(super) async fn load_item(state: &AppState, raw_id: &str) -> Result<Item, AppError> {
    let id: ItemId = parse_id(raw_id, "item")?;
    state
        .db()
        .get_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {id}")))
}

async fn render_new(
    page: &Page,
    form: ItemForm,
    errors: FormErrors,
    stores: Vec<Store>,
) -> Result<Response, AppError> {
    Ok(NewItemTemplate {
        layout: page.layout().await?,
        form,
        errors,
        stores,
        categories: ItemCategory::choices(),
    }
    .into_response())
}

async fn render_detail(
    page: &Page,
    item: Item,
    form: ItemForm,
    errors: FormErrors,
    stores: Vec<Store>,
) -> Result<Response, AppError> {
    Ok(ItemDetailTemplate {
        layout: page.layout().await?,
        item,
        form,
        errors,
        stores,
        categories: ItemCategory::choices(),
    }
    .into_response())
}
