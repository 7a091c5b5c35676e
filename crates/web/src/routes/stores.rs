//! Store listing, creation, and detail/edit handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use grocery_core::StoreId;

use super::{Layout, Page, parse_id};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::forms::{FormErrors, StoreForm};
use crate::middleware::{CsrfForm, RequireAuth};
use crate::models::{Item, Store};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Home page: every store.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub stores: Vec<Store>,
}

/// New store form.
#[derive(Template, WebTemplate)]
#[template(path = "new_store.html")]
pub struct NewStoreTemplate {
    pub layout: Layout,
    pub form: StoreForm,
    pub errors: FormErrors,
}

/// Store detail with its items and an edit form.
#[derive(Template, WebTemplate)]
#[template(path = "store_detail.html")]
pub struct StoreDetailTemplate {
    pub layout: Layout,
    pub store: Store,
    pub items: Vec<Item>,
    pub form: StoreForm,
    pub errors: FormErrors,
}

// =============================================================================
// Handlers
// =============================================================================

/// List all stores.
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, page: Page) -> Result<Response, AppError> {
    let stores = state.db().list_stores().await?;

    Ok(HomeTemplate {
        layout: page.layout().await?,
        stores,
    }
    .into_response())
}

/// Display an empty new store form.
pub async fn new_store_page(page: Page) -> Result<Response, AppError> {
    Ok(NewStoreTemplate {
        layout: page.layout().await?,
        form: StoreForm::default(),
        errors: FormErrors::new(),
    }
    .into_response())
}

/// Handle new store submission.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create_store(
    State(state): State<AppState>,
    page: Page,
    RequireAuth(user): RequireAuth,
    CsrfForm(form): CsrfForm<StoreForm>,
) -> Result<Response, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(NewStoreTemplate {
                layout: page.layout().await?,
                form,
                errors,
            }
            .into_response());
        }
    };

    let store = state.db().create_store(&input, user.id).await?;
    tracing::info!(store_id = %store.id, title = %store.title, "Store created");
    let store_id = store.id.to_string();
    add_breadcrumb("inventory", "Created store", Some(&[("store_id", store_id.as_str())]));

    page.flash("New store created!").await?;
    Ok(Redirect::to(&format!("/store/{}", store.id)).into_response())
}

/// Display a store, its items, and the pre-filled edit form.
#[instrument(skip(state, page))]
pub async fn store_detail(
    State(state): State<AppState>,
    page: Page,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let store = load_store(&state, &raw_id).await?;
    let form = StoreForm::from_store(&store);

    render_detail(&state, &page, store, form, FormErrors::new()).await
}

/// Handle store edit submission.
#[instrument(skip(state, page, form))]
pub async fn update_store(
    State(state): State<AppState>,
    page: Page,
    Path(raw_id): Path<String>,
    CsrfForm(form): CsrfForm<StoreForm>,
) -> Result<Response, AppError> {
    let store = load_store(&state, &raw_id).await?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return render_detail(&state, &page, store, form, errors).await,
    };

    let store = state.db().update_store(store.id, &input).await?;
    tracing::info!(store_id = %store.id, "Store updated");

    page.flash("Store details were changed!").await?;
    Ok(Redirect::to(&format!("/store/{}", store.id)).into_response())
}

// =============================================================================
// Helpers
// =============================================================================

async fn load_store(state: &AppState, raw_id: &str) -> Result<Store, AppError> {
    let id: StoreId = parse_id(raw_id, "store")?;
    state
        .db()
        .get_store(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {id}")))
}

async fn render_detail(
    state: &AppState,
    page: &Page,
    store: Store,
    form: StoreForm,
    errors: FormErrors,
) -> Result<Response, AppError> {
    let items = state.db().list_items_for_store(store.id).await?;

    Ok(StoreDetailTemplate {
        layout: page.layout().await?,
        store,
        items,
        form,
        errors,
    }
    .into_response())
}
