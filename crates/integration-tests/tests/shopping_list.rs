//! Per-user shopping lists.

#![allow(clippy::unwrap_used)]

use grocery_integration_tests::{TestApp, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_add_to_shopping_list() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;
    let store_id = app.create_store("Corner Shop", "12 Market Street").await;
    let item_id = app.create_item("Apples", "1.50", &store_id).await;

    let (_, body) = app.get_html("/shopping_list").await;
    assert!(body.contains("Your shopping list is empty."));

    let resp = app
        .post_form(&format!("/add_to_shopping_list/{item_id}"), &[])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/item/{item_id}"));

    let (_, body) = app.get_html(&format!("/item/{item_id}")).await;
    assert!(body.contains("Item added successfully"));

    let (status, body) = app.get_html("/shopping_list").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("1 item"));
    assert!(body.contains("Apples"));
}

#[tokio::test]
async fn test_shopping_list_keeps_duplicates_in_order() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;
    let store_id = app.create_store("Corner Shop", "12 Market Street").await;
    let apples = app.create_item("Apples", "1.50", &store_id).await;
    let bread = app.create_item("Bread", "3.00", &store_id).await;

    for id in [&bread, &apples, &bread] {
        let resp = app
            .post_form(&format!("/add_to_shopping_list/{id}"), &[])
            .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    let (_, body) = app.get_html("/shopping_list").await;
    assert!(body.contains("3 items"));
    assert_eq!(body.matches(r#"<a href="/item/"#).count(), 3);
    let first_bread = body.find("Bread").unwrap();
    let first_apples = body.find("Apples").unwrap();
    assert!(first_bread < first_apples);
}

#[tokio::test]
async fn test_shopping_lists_are_per_user() {
    let alice = TestApp::spawn().await;
    alice.sign_up_and_log_in("alice").await;
    let store_id = alice.create_store("Corner Shop", "12 Market Street").await;
    let item_id = alice.create_item("Apples", "1.50", &store_id).await;
    alice
        .post_form(&format!("/add_to_shopping_list/{item_id}"), &[])
        .await;

    let bob = alice.other_client();
    bob.sign_up_and_log_in("bob").await;
    let (_, body) = bob.get_html("/shopping_list").await;
    assert!(body.contains("Your shopping list is empty."));
}

#[tokio::test]
async fn test_add_missing_item_is_not_found() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;

    let resp = app.post_form("/add_to_shopping_list/999", &[]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_requires_csrf_token() {
    let app = TestApp::spawn().await;
    app.sign_up_and_log_in("alice").await;
    let store_id = app.create_store("Corner Shop", "12 Market Street").await;
    let item_id = app.create_item("Apples", "1.50", &store_id).await;

    let resp = app
        .post_raw(&format!("/add_to_shopping_list/{item_id}"), &[])
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
