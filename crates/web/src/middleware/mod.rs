//! HTTP middleware and request extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. Session layer (tower-sessions)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (records into the span, echoes header)
//! 5. Security headers
//! 6. Identity resolution (session user into request extensions)
//! 7. Login guard (protected routes only, via `route_layer`)

pub mod auth;
pub mod csrf;
pub mod flash;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    Identity, LOGIN_REQUIRED_MESSAGE, RequireAuth, clear_current_user, login_redirect,
    require_login, resolve_identity, safe_next, set_current_user,
};
pub use csrf::{CsrfForm, CsrfProtected};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
