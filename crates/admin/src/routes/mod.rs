//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Health check
//! POST /api/products/check-slug   - Product slug availability (proxied to the backend)
//! ```

mod slug;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/products/check-slug", post(slug::check_slug))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::AdminConfig;

    fn app(backend: &str) -> Router {
        let config = AdminConfig {
            backend_base_url: Url::parse(backend).unwrap(),
            ..AdminConfig::from_lookup(|_| None).unwrap()
        };
        routes().with_state(AppState::new(config))
    }

    fn check_slug_request(body: &str) -> Request<Body> {
        Request::post("/api/products/check-slug")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app("http://127.0.0.1:9")
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_slug_is_bad_request() {
        for body in [r"{}", r#"{"slug":""}"#, r#"{"slug":"   "}"#] {
            let response = app("http://127.0.0.1:9")
                .oneshot(check_slug_request(body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(
                json_body(response).await,
                serde_json::json!({ "error": "Slug is required" })
            );
        }
    }

    #[tokio::test]
    async fn test_unreadable_body_is_internal_error() {
        for body in ["", "{not json", "[1,2]"] {
            let response = app("http://127.0.0.1:9")
                .oneshot(check_slug_request(body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{body}");
            assert_eq!(
                json_body(response).await,
                serde_json::json!({ "error": "Internal server error" })
            );
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_internal_error() {
        // Nothing listens on port 9.
        let response = app("http://127.0.0.1:9")
            .oneshot(check_slug_request(r#"{"slug":"naruto-hoodie"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "error": "Internal server error" })
        );
    }
}
