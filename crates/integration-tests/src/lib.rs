//! Integration tests for the grocery web app.
//!
//! Every test boots the full router on an ephemeral port with the in-memory
//! database and session store, then drives it over HTTP with a cookie-aware
//! client, so no external services are needed.
//!
//! ```bash
//! cargo test -p grocery-integration-tests
//! ```

use std::net::SocketAddr;

use grocery_web::config::GroceryConfig;
use grocery_web::db;
use grocery_web::state::AppState;
use reqwest::{Client, Response, StatusCode, header};
use tower_sessions::MemoryStore;

/// Password used by [`TestApp::sign_up_and_log_in`].
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// A running app plus a client that keeps its cookies.
pub struct TestApp {
    addr: SocketAddr,
    client: Client,
}

impl TestApp {
    /// Start a fresh app with empty storage.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration is invalid, the listener cannot
    /// be bound or the client cannot be built.
    pub async fn spawn() -> Self {
        let config = GroceryConfig::in_memory().expect("Default configuration is valid");
        let state = AppState::new(config, db::memory());
        let app = grocery_web::app(state, MemoryStore::default());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Test server error");
        });

        Self {
            addr,
            client: new_client(),
        }
    }

    /// A second browser against the same app (separate cookie jar).
    #[must_use]
    pub fn other_client(&self) -> Self {
        Self {
            addr: self.addr,
            client: new_client(),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET a page and return its status and body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get_html(&self, path: &str) -> (StatusCode, String) {
        let resp = self.get(path).await;
        let status = resp.status();
        (status, resp.text().await.expect("Failed to read body"))
    }

    /// POST a form exactly as given.
    ///
    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post_raw(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .expect("POST request failed")
    }

    /// POST a form with the session's anti-forgery token added, the way a
    /// browser submits a rendered form.
    ///
    /// # Panics
    ///
    /// Panics if the token cannot be obtained or the request fails.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> Response {
        let token = self.csrf_token().await;
        let mut with_token = vec![("csrf_token", token.as_str())];
        with_token.extend_from_slice(fields);
        self.post_raw(path, &with_token).await
    }

    /// Read the current session's token from a rendered page.
    ///
    /// Rendering the page consumes any pending flash messages.
    ///
    /// # Panics
    ///
    /// Panics if the page has no token.
    pub async fn csrf_token(&self) -> String {
        let (_, body) = self.get_html("/signup").await;
        extract_csrf_token(&body).expect("Page has no csrf token")
    }

    /// Create an account and log in with it.
    ///
    /// # Panics
    ///
    /// Panics if either step does not redirect.
    pub async fn sign_up_and_log_in(&self, username: &str) {
        let resp = self
            .post_form(
                "/signup",
                &[("username", username), ("password", TEST_PASSWORD)],
            )
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "sign-up failed");

        let resp = self
            .post_form(
                "/login",
                &[("username", username), ("password", TEST_PASSWORD)],
            )
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "login failed");
    }

    /// Create a store and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the store is not created.
    pub async fn create_store(&self, title: &str, address: &str) -> String {
        let resp = self
            .post_form("/new_store", &[("title", title), ("address", address)])
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "store not created");
        id_from_location(&resp, "/store/")
    }

    /// Create an item and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the item is not created.
    pub async fn create_item(&self, name: &str, price: &str, store_id: &str) -> String {
        let resp = self
            .post_form(
                "/new_item",
                &[
                    ("name", name),
                    ("price", price),
                    ("category", "PRODUCE"),
                    ("photo_url", "https://images.example.com/item.jpg"),
                    ("store_id", store_id),
                ],
            )
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "item not created");
        id_from_location(&resp, "/item/")
    }
}

fn new_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The `Location` header of a redirect.
///
/// # Panics
///
/// Panics if the header is missing.
#[must_use]
pub fn location(resp: &Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("Response has no Location header")
        .to_owned()
}

/// The id at the end of a redirect such as `/store/3`.
///
/// # Panics
///
/// Panics if the redirect does not start with `prefix`.
#[must_use]
pub fn id_from_location(resp: &Response, prefix: &str) -> String {
    let location = location(resp);
    location
        .strip_prefix(prefix)
        .unwrap_or_else(|| panic!("Unexpected redirect {location}"))
        .to_owned()
}

/// Pull the hidden `csrf_token` value out of rendered HTML.
#[must_use]
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let len = html.get(start..)?.find('"')?;
    html.get(start..start + len).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_csrf_token() {
        let html = r#"<input type="hidden" name="csrf_token" value="abc-123_x">"#;
        assert_eq!(extract_csrf_token(html).as_deref(), Some("abc-123_x"));
        assert_eq!(extract_csrf_token("<form></form>"), None);
    }
}
