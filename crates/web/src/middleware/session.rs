//! Session middleware configuration.
//!
//! `PostgreSQL`-backed sessions in production; the in-memory store serves the
//! `memory://` mode and the tests.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::GroceryConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "grocery_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over any session store.
///
/// The cookie is `HttpOnly`, `SameSite=Lax`, and `Secure` when the public
/// base URL is https.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &GroceryConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
