//! Store listing, creation and editing.

#![allow(clippy::unwrap_used)]

use grocery_integration_tests::{TestApp, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_home_lists_stores_for_anyone() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get_html("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No stores yet."));

    app.sign_up_and_log_in("alice").await;
    let id = app.create_store("Corner Shop", "12 Market Street").await;

    let visitor = app.other_client();
    let (status, body) = visitor.get_html("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Corner Shop"));
    assert!(body.contains(&format!(r#"href="/store/{id}""#)));
}

#[tokio::test]
async fn test_create_store_redirects_to_detail_with_flash() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;

    let resp = app
        .post_form(
            "/new_store",
            &[("title", "  Corner Shop "), ("address", "12 Market Street")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let detail = location(&resp);
    assert!(detail.starts_with("/store/"));

    let (status, body) = app.get_html(&detail).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("New store created!"));
    assert!(body.contains("<h1>Corner Shop</h1>"));
    assert!(body.contains("This store has no items yet."));
}

#[tokio::test]
async fn test_create_store_validates_lengths() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;

    let resp = app
        .post_form("/new_store", &[("title", "ab"), ("address", "short")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Field must be between 3 and 80 characters long."));
    assert!(body.contains("Field must be between 10 and 120 characters long."));

    let resp = app
        .post_form(
            "/new_store",
            &[("title", "abc"), ("address", &"a".repeat(120))],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = app
        .post_form(
            "/new_store",
            &[("title", &"t".repeat(81)), ("address", "12 Market Street")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_store_requires_fields() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;

    let resp = app.post_form("/new_store", &[]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert_eq!(body.matches("This field is required.").count(), 2);
}

#[tokio::test]
async fn test_edit_store_round_trip() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;
    let id = app.create_store("Corner Shop", "12 Market Street").await;
    let path = format!("/store/{id}");

    let (_, body) = app.get_html(&path).await;
    assert!(body.contains(r#"value="Corner Shop""#));

    let resp = app
        .post_form(&path, &[("title", "Big Market"), ("address", "99 Harbour Road")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), path);

    let (_, body) = app.get_html(&path).await;
    assert!(body.contains("Store details were changed!"));
    assert!(body.contains("<h1>Big Market</h1>"));
    assert!(body.contains("99 Harbour Road"));
    assert!(!body.contains("Corner Shop"));
}

#[tokio::test]
async fn test_editing_title_keeps_address() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;
    let id = app.create_store("Main Market", "123 Long Street").await;
    let path = format!("/store/{id}");

    let resp = app
        .post_form(&path, &[("title", "Main Market 2"), ("address", "123 Long Street")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let (_, body) = app.get_html(&path).await;
    assert!(body.contains("<h1>Main Market 2</h1>"));
    assert!(body.contains(r#"<p class="address">123 Long Street</p>"#));
    assert!(body.contains(r#"value="123 Long Street""#));
}

#[tokio::test]
async fn test_invalid_edit_keeps_store_unchanged() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;
    let id = app.create_store("Corner Shop", "12 Market Street").await;
    let path = format!("/store/{id}");

    let resp = app
        .post_form(&path, &[("title", "x"), ("address", "12 Market Street")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.text()
            .await
            .unwrap()
            .contains("Field must be between 3 and 80 characters long.")
    );

    let (_, body) = app.get_html("/").await;
    assert!(body.contains("Corner Shop"));
}

#[tokio::test]
async fn test_missing_store_is_not_found() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;

    assert_eq!(app.get("/store/999").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/store/abc").await.status(), StatusCode::NOT_FOUND);

    let resp = app
        .post_form(
            "/store/999",
            &[("title", "Corner Shop"), ("address", "12 Market Street")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_detail_lists_its_items() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;
    let corner = app.create_store("Corner Shop", "12 Market Street").await;
    let market = app.create_store("Big Market", "99 Harbour Road").await;
    app.create_item("Apples", "1.50", &corner).await;
    app.create_item("Bread", "3", &market).await;

    let (_, body) = app.get_html(&format!("/store/{corner}")).await;
    assert!(body.contains("Apples"));
    assert!(!body.contains("Bread"));
}
