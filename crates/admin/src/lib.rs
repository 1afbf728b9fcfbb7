//! Anime Tribes admin library.
//!
//! The back-office core: the admin session store, access decisions for the
//! admin areas, the permission-filtered sidebar and product slug tooling,
//! plus the small HTTP service that proxies slug checks to the backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod config;
pub mod error;
pub mod navigation;
pub mod routes;
pub mod session;
pub mod slug;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// The admin HTTP application with tracing and Sentry layers applied.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
