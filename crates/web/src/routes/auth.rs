//! Sign-up, login, and logout handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use super::{Layout, Page};
use crate::error::AppError;
use crate::filters;
use crate::forms::{FormErrors, LoginForm, SignUpForm, USERNAME_TAKEN_MESSAGE};
use crate::middleware::{CsrfForm, clear_current_user, safe_next, set_current_user};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Shown when the username/password pair does not match an account.
pub const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password.";

// =============================================================================
// Query Types
// =============================================================================

/// Where to go after a successful login.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl NextQuery {
    /// Form action that keeps the `next` parameter across a re-render.
    fn login_action(&self) -> String {
        match self.next.as_deref() {
            Some(next) if !next.is_empty() => {
                format!("/login?next={}", urlencoding::encode(next))
            }
            _ => "/login".to_owned(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignUpTemplate {
    pub layout: Layout,
    pub form: SignUpForm,
    pub errors: FormErrors,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub form: LoginForm,
    pub errors: FormErrors,
    /// Credential failure, shown above the form.
    pub error: Option<String>,
    pub action: String,
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(page: Page) -> Result<Response, AppError> {
    Ok(SignUpTemplate {
        layout: page.layout().await?,
        form: SignUpForm::default(),
        errors: FormErrors::new(),
    }
    .into_response())
}

/// Handle sign-up form submission.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    page: Page,
    CsrfForm(form): CsrfForm<SignUpForm>,
) -> Result<Response, AppError> {
    let credentials = match form.validate(state.db()).await? {
        Ok(credentials) => credentials,
        Err(errors) => return render_signup(&page, &form, errors).await,
    };

    match AuthService::new(state.db())
        .register(&credentials.username, &credentials.password)
        .await
    {
        Ok(_) => {}
        // Lost a race with a concurrent sign-up for the same name.
        Err(AuthError::UserAlreadyExists) => {
            let mut errors = FormErrors::new();
            errors.insert("username", USERNAME_TAKEN_MESSAGE);
            return render_signup(&page, &form, errors).await;
        }
        Err(e) => return Err(e.into()),
    }

    page.flash("Account Created.").await?;
    Ok(Redirect::to("/login").into_response())
}

async fn render_signup(
    page: &Page,
    form: &SignUpForm,
    errors: FormErrors,
) -> Result<Response, AppError> {
    Ok(SignUpTemplate {
        layout: page.layout().await?,
        form: form.redisplay(),
        errors,
    }
    .into_response())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    page: Page,
    Query(query): Query<NextQuery>,
) -> Result<Response, AppError> {
    Ok(LoginTemplate {
        layout: page.layout().await?,
        form: LoginForm::default(),
        errors: FormErrors::new(),
        error: None,
        action: query.login_action(),
    }
    .into_response())
}

/// Handle login form submission.
///
/// On success the session id is rotated and the user is sent to `next` when
/// it is a local path, otherwise to the home page.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    page: Page,
    Query(query): Query<NextQuery>,
    CsrfForm(form): CsrfForm<LoginForm>,
) -> Result<Response, AppError> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => return render_login(&page, &form, errors, None, &query).await,
    };

    let user = match AuthService::new(state.db())
        .login(&credentials.username, &credentials.password)
        .await
    {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(username = %credentials.username, "Login failed");
            return render_login(
                &page,
                &form,
                FormErrors::new(),
                Some(INVALID_LOGIN_MESSAGE),
                &query,
            )
            .await;
        }
        Err(e) => return Err(e.into()),
    };

    set_current_user(page.session(), &user).await?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Redirect::to(safe_next(query.next.as_deref())).into_response())
}

async fn render_login(
    page: &Page,
    form: &LoginForm,
    errors: FormErrors,
    error: Option<&str>,
    query: &NextQuery,
) -> Result<Response, AppError> {
    Ok(LoginTemplate {
        layout: page.layout().await?,
        form: form.redisplay(),
        errors,
        error: error.map(str::to_owned),
        action: query.login_action(),
    }
    .into_response())
}

/// Log out and return to the home page.
#[instrument(skip_all)]
pub async fn logout(page: Page) -> Result<Response, AppError> {
    if let Some(user) = page.identity().user() {
        tracing::info!(user_id = %user.id, "User logged out");
    }
    clear_current_user(page.session()).await?;

    Ok(Redirect::to("/").into_response())
}
