//! Sign-up, login, logout and the login guard.

#![allow(clippy::unwrap_used)]

use grocery_integration_tests::{TEST_PASSWORD, TestApp, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_signup_redirects_to_login_with_flash() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_form("/signup", &[("username", "alice"), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");

    let (status, body) = app.get_html("/login").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Account Created."));

    // Flashes are shown once.
    let (_, body) = app.get_html("/login").await;
    assert!(!body.contains("Account Created."));
}

#[tokio::test]
async fn test_signup_rejects_duplicate_username() {
    let app = TestApp::spawn().await;
    app.post_form("/signup", &[("username", "alice"), ("password", "pw")])
        .await;

    let resp = app
        .post_form("/signup", &[("username", "alice"), ("password", "other")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("That username is taken. Please choose a different one."));
    assert!(body.contains(r#"value="alice""#));
}

#[tokio::test]
async fn test_signup_username_length_bounds() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_form("/signup", &[("username", "ab"), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("Field must be between 3 and 50 characters long.")
    );

    let long_name = "u".repeat(51);
    let resp = app
        .post_form("/signup", &[("username", &long_name), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let max_name = "u".repeat(50);
    let resp = app
        .post_form("/signup", &[("username", &max_name), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_signup_requires_password() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_form("/signup", &[("username", "alice"), ("password", "")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("This field is required."));
}

#[tokio::test]
async fn test_login_with_wrong_password_rerenders() {
    let app = TestApp::spawn().await;
    app.post_form("/signup", &[("username", "alice"), ("password", "pw")])
        .await;

    let resp = app
        .post_form("/login", &[("username", "alice"), ("password", "nope")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid username or password."));

    // Still anonymous.
    let resp = app.get("/shopping_list").await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_login_with_unknown_user_rerenders() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_form("/login", &[("username", "ghost"), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("Invalid username or password."));
}

#[tokio::test]
async fn test_login_then_logout() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;

    let (status, body) = app.get_html("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Logged in as alice"));

    let resp = app.get("/logout").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let (_, body) = app.get_html("/").await;
    assert!(!body.contains("Logged in as alice"));
    assert_eq!(app.get("/shopping_list").await.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_login_follows_local_next() {
    let app = TestApp::spawn().await;
    app.post_form("/signup", &[("username", "alice"), ("password", TEST_PASSWORD)])
        .await;

    let resp = app
        .post_form(
            "/login?next=%2Fshopping_list",
            &[("username", "alice"), ("password", TEST_PASSWORD)],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/shopping_list");
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let app = TestApp::spawn().await;
    app.post_form("/signup", &[("username", "alice"), ("password", TEST_PASSWORD)])
        .await;

    let resp = app
        .post_form(
            "/login?next=https%3A%2F%2Fevil.example.com%2F",
            &[("username", "alice"), ("password", TEST_PASSWORD)],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_login_ignores_next_with_control_characters() {
    let app = TestApp::spawn().await;
    app.post_form("/signup", &[("username", "alice"), ("password", TEST_PASSWORD)])
        .await;

    for next in ["%2F%09%2Fevil.example.com", "%2F%0A", "%2F%0D%0ASet-Cookie%3A%20x%3Dy"] {
        let resp = app
            .post_form(
                &format!("/login?next={next}"),
                &[("username", "alice"), ("password", TEST_PASSWORD)],
            )
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{next}");
        assert_eq!(location(&resp), "/", "{next}");
    }
}

#[tokio::test]
async fn test_anonymous_get_redirects_to_login_with_next() {
    let app = TestApp::spawn().await;

    for path in ["/new_store", "/new_item", "/shopping_list", "/store/1", "/item/1", "/logout"] {
        let resp = app.get(path).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{path}");
        assert_eq!(
            location(&resp),
            format!("/login?next={}", urlencoding::encode(path)),
            "{path}"
        );
    }

    let (_, body) = app.get_html("/login").await;
    assert!(body.contains("Please log in to access this page."));
}

#[tokio::test]
async fn test_anonymous_post_redirects_before_any_write() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_form(
            "/new_store",
            &[("title", "Corner Shop"), ("address", "12 Market Street")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?next=%2Fnew_store");

    let resp = app.post_raw("/add_to_shopping_list/1", &[]).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login?next=%2Fadd_to_shopping_list%2F1");

    let (_, body) = app.get_html("/").await;
    assert!(!body.contains("Corner Shop"));
}

#[tokio::test]
async fn test_login_form_keeps_next_in_action() {
    let app = TestApp::spawn().await;

    let (_, body) = app.get_html("/login?next=%2Fstore%2F2").await;
    assert!(body.contains(r#"action="/login?next=%2Fstore%2F2""#));
}

#[tokio::test]
async fn test_post_without_csrf_token_is_forbidden() {
    let app = TestApp::spawn().await;
    // Establish a session token first.
    app.csrf_token().await;

    let resp = app
        .post_raw("/signup", &[("username", "alice"), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .post_raw(
            "/signup",
            &[("csrf_token", "forged"), ("username", "alice"), ("password", "pw")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_csrf_token_is_per_session() {
    let app = TestApp::spawn().await;
    let other = app.other_client();

    let token = app.csrf_token().await;
    other.csrf_token().await;

    let resp = other
        .post_raw(
            "/signup",
            &[("csrf_token", &token), ("username", "alice"), ("password", "pw")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
