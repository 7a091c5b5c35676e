//! Anti-forgery tokens for HTML forms.
//!
//! Each session carries a random token (128-bit, URL-safe base64). Pages embed
//! it as a hidden `csrf_token` input and [`CsrfForm`] checks it before the
//! handler sees the submission.

use axum::{
    Form,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::de::DeserializeOwned;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;

/// Form types that carry an anti-forgery token.
pub trait CsrfProtected {
    /// The submitted token.
    fn csrf_token(&self) -> &str;
}

/// Generate a new random token.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// The session's token, created on first use.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn session_token(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(token) = session.get::<String>(session_keys::CSRF_TOKEN).await? {
        return Ok(token);
    }
    let token = generate_token();
    session.insert(session_keys::CSRF_TOKEN, &token).await?;
    Ok(token)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

/// URL-encoded form extractor that rejects submissions without the
/// session's anti-forgery token (`403 Forbidden`).
///
/// # Example
///
/// ```rust,ignore
/// async fn create(CsrfForm(form): CsrfForm<StoreForm>) -> impl IntoResponse { /* ... */ }
/// ```
pub struct CsrfForm<T>(pub T);

impl<S, T> FromRequest<S> for CsrfForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + CsrfProtected + Send,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let session = req
            .extensions()
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_owned()).into_response())?;

        let Form(form) = Form::<T>::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let expected = session
            .get::<String>(session_keys::CSRF_TOKEN)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        match expected {
            Some(expected) if constant_time_compare(&expected, form.csrf_token()) => Ok(Self(form)),
            _ => {
                tracing::warn!("Rejected form submission with missing or invalid csrf token");
                Err(AppError::Forbidden("csrf token mismatch".to_owned()).into_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("token", "token"));
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("token", "tokem"));
        assert!(!constant_time_compare("token", "toke"));
    }

    #[test]
    fn test_generate_token_is_random() {
        let first = generate_token();
        let second = generate_token();
        assert_eq!(first.len(), 22);
        assert!(first.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
        assert_ne!(first, second);
    }
}
