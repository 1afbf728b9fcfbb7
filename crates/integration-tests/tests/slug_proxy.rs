//! Admin slug check route proxied to a fake backend over real HTTP.

#![allow(clippy::unwrap_used)]

use anime_tribes_admin::config::AdminConfig;
use anime_tribes_admin::slug::{SlugAvailability, SlugClient, SlugError};
use anime_tribes_admin::state::AppState;
use anime_tribes_integration_tests::{FAILING_SLUG, serve, slug_backend};
use reqwest::StatusCode;
use serde_json::{Value, json};
use url::Url;

/// Start a fake backend and the admin app in front of it.
async fn start(taken: &[&str]) -> (Url, Url) {
    let backend = serve(slug_backend(taken)).await;
    let backend_url = backend.to_string();
    let config = AdminConfig::from_lookup(|key| {
        (key == "BACKEND_BASE_URL").then(|| backend_url.clone())
    })
    .unwrap();
    let admin = serve(anime_tribes_admin::app(AppState::new(config))).await;
    (backend, admin)
}

async fn post_slug(admin: &Url, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(admin.join("/api/products/check-slug").unwrap())
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_taken_slug() {
    let (_, admin) = start(&["straw-hat"]).await;
    let (status, body) = post_slug(&admin, json!({ "slug": "straw-hat" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exists": true }));
}

#[tokio::test]
async fn test_available_slug() {
    let (_, admin) = start(&["straw-hat"]).await;
    let (status, body) = post_slug(&admin, json!({ "slug": "going-merry" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exists": false }));
}

#[tokio::test]
async fn test_blank_slug_is_rejected() {
    let (_, admin) = start(&[]).await;

    for body in [json!({ "slug": "   " }), json!({})] {
        let (status, body) = post_slug(&admin, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Slug is required" }));
    }
}

#[tokio::test]
async fn test_backend_failure_is_internal_error() {
    let (_, admin) = start(&[]).await;
    let (status, body) = post_slug(&admin, json!({ "slug": FAILING_SLUG })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_unreadable_body_is_internal_error() {
    let (_, admin) = start(&[]).await;
    let response = reqwest::Client::new()
        .post(admin.join("/api/products/check-slug").unwrap())
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"slug\":")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[tokio::test]
async fn test_client_encodes_slug() {
    let (backend, _) = start(&["one piece"]).await;
    let client = SlugClient::new(backend);

    assert_eq!(client.check("one piece").await.unwrap(), SlugAvailability::Taken);
    assert_eq!(client.check("").await.unwrap(), SlugAvailability::Unknown);
    assert!(matches!(
        client.check(FAILING_SLUG).await,
        Err(SlugError::Backend { status: 500 })
    ));
}
