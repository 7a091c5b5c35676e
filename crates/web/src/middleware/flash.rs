//! One-time messages carried in the session to the next rendered page.

use tower_sessions::Session;
use tower_sessions::session::Error;

use crate::models::session_keys;

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push(session: &Session, message: impl Into<String>) -> Result<(), Error> {
    let mut flashes: Vec<String> = session.get(session_keys::FLASHES).await?.unwrap_or_default();
    flashes.push(message.into());
    session.insert(session_keys::FLASHES, flashes).await
}

/// Remove and return every queued message, oldest first.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn take(session: &Session) -> Result<Vec<String>, Error> {
    Ok(session
        .remove::<Vec<String>>(session_keys::FLASHES)
        .await?
        .unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flashes_are_shown_once_in_order() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        push(&session, "first").await.unwrap();
        push(&session, "second").await.unwrap();

        assert_eq!(take(&session).await.unwrap(), ["first", "second"]);
        assert!(take(&session).await.unwrap().is_empty());
    }
}
