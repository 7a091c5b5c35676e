//! Per-page context shared by every template.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{Identity, csrf, flash};

/// Data the base template needs on every page.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Logged-in username, if any.
    pub username: Option<String>,
    /// Flash messages to show once.
    pub flashes: Vec<String>,
    /// Anti-forgery token for forms on the page.
    pub csrf_token: String,
}

/// Request context for handlers: the session and the resolved identity.
///
/// Extracting it has no side effects; flashes are only consumed when
/// [`Page::layout`] is called to render a page.
pub struct Page {
    session: Session,
    identity: Identity,
}

impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_owned()))?;
        let identity = parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or_default();

        Ok(Self { session, identity })
    }
}

impl Page {
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Queue a flash message for the next rendered page.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be written.
    pub async fn flash(&self, message: &str) -> Result<(), AppError> {
        flash::push(&self.session, message).await?;
        Ok(())
    }

    /// Build the layout for a rendered page, consuming queued flashes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be read or written.
    pub async fn layout(&self) -> Result<Layout, AppError> {
        Ok(Layout {
            username: self.identity.user().map(|u| u.username.clone()),
            flashes: flash::take(&self.session).await?,
            csrf_token: csrf::session_token(&self.session).await?,
        })
    }
}
