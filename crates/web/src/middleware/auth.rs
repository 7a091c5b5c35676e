//! Identity resolution, the login guard, and auth extractors.
//!
//! [`resolve_identity`] runs on every request and inserts an [`Identity`]
//! into the request extensions. [`require_login`] is attached with
//! `route_layer` to the protected routes, so it rejects anonymous requests
//! before any extractor or handler runs.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header, request::Parts, uri::PathAndQuery},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::Span;

use super::flash;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, User, session_keys};
use crate::state::AppState;

/// Flash shown when the login guard redirects.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

/// Who is making the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    User(CurrentUser),
}

impl Identity {
    /// The logged-in user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// Middleware that resolves the session user into an [`Identity`].
///
/// A session that points at a user who no longer exists is treated as
/// anonymous and the stale entry is removed.
///
/// # Errors
///
/// Returns `AppError` if the session or the user lookup fails.
pub async fn resolve_identity(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match session.get::<CurrentUser>(session_keys::CURRENT_USER).await? {
        Some(current) => match state.db().get_user(current.id).await? {
            Some(user) => Identity::User(CurrentUser::from(&user)),
            None => {
                tracing::info!(user_id = %current.id, "Session user no longer exists");
                session
                    .remove::<CurrentUser>(session_keys::CURRENT_USER)
                    .await?;
                Identity::Anonymous
            }
        },
        None => Identity::Anonymous,
    };

    if let Identity::User(user) = &identity {
        Span::current().record("user_id", user.id.as_i32());
        set_sentry_user(&user.id, &user.username);
    }

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Middleware that redirects anonymous requests to the login page.
///
/// The original path (with query) is carried in `next`, and a flash asks
/// the user to log in.
///
/// # Errors
///
/// Returns `AppError` if the flash cannot be stored.
pub async fn require_login(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request
        .extensions()
        .get::<Identity>()
        .is_some_and(Identity::is_authenticated)
    {
        return Ok(next.run(request).await);
    }

    let target = request
        .uri()
        .path_and_query()
        .map_or("/", PathAndQuery::as_str);
    tracing::debug!(path = %target, "Login required");
    flash::push(&session, LOGIN_REQUIRED_MESSAGE).await?;

    Ok(login_redirect(target))
}

/// `302 Found` to the login page, remembering where to go afterwards.
#[must_use]
pub fn login_redirect(next: &str) -> Response {
    let location = format!("/login?next={}", urlencoding::encode(next));
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// Where to send a user after login.
///
/// Only same-site absolute paths are honored; anything else (missing,
/// relative, protocol-relative or backslash tricks) falls back to `/`.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => "/",
    }
}

/// A path that stays on this site and is safe to put in a `Location` header.
///
/// Browsers drop tabs and newlines while parsing URLs, so `/\t/evil.com`
/// would become protocol-relative; only URL-safe ASCII is accepted.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && path.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"/_-.~?=&%+:@!$'()*,;".contains(&b)
        })
}

/// Extractor that requires an authenticated user.
///
/// Protected routes already pass through [`require_login`]; this gives
/// handlers the user and rejects the same way if used elsewhere.
///
/// # Example
///
/// ```rust,ignore
/// async fn shopping_list(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("{}'s list", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Rejection for [`RequireAuth`]: redirect to login.
pub struct AuthRejection {
    next: String,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        login_redirect(&self.next)
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Identity>() {
            Some(Identity::User(user)) => Ok(Self(user.clone())),
            _ => Err(AuthRejection {
                next: parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| "/".to_owned(), ToString::to_string),
            }),
        }
    }
}

/// Log a user in: rotate the session id, then store the identity.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_USER, CurrentUser::from(user))
        .await?;
    set_sentry_user(&user.id, &user.username);
    Ok(())
}

/// Log out: discard the whole session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}
