//! Shared fixtures for the Anime Tribes integration tests.
//!
//! Everything runs in-process: fake backends are axum routers served on an
//! ephemeral port, and the stores use `MemoryStorage`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p anime-tribes-integration-tests
//! ```

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

use anime_tribes_core::{Email, ProductId};
use anime_tribes_storefront::cart::CartLine;
use anime_tribes_storefront::checkout::ShippingAddress;
use anime_tribes_storefront::orders::OrderContact;

/// Serve `router` on `127.0.0.1` at an ephemeral port and return its base URL.
pub async fn serve(router: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });
    Url::parse(&format!("http://{addr}")).expect("Invalid test server URL")
}

// ============================================================================
// Fixtures
// ============================================================================

/// Product 1 at $29.99, quantity 2.
pub fn straw_hat() -> CartLine {
    CartLine::new(ProductId::new(1), "Straw Hat", Decimal::new(2999, 2), 2)
}

pub fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "A B".to_string(),
        address_line1: "1 Main St".to_string(),
        address_line2: String::new(),
        city: "X".to_string(),
        state: "Y".to_string(),
        zip_code: "00000".to_string(),
        country: "United States".to_string(),
    }
}

pub fn customer() -> OrderContact {
    OrderContact {
        name: "A B".to_string(),
        email: Email::parse("ab@animetribes.test").expect("valid email"),
        phone: None,
    }
}

/// True if `s` looks like `ORD-` followed by six digits.
pub fn is_order_number(s: &str) -> bool {
    s.strip_prefix("ORD-")
        .is_some_and(|digits| digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_digit()))
}

// ============================================================================
// Fake order backend
// ============================================================================

/// One order creation request as the backend saw it.
#[derive(Debug, Clone)]
pub struct ReceivedOrder {
    pub idempotency_key: Option<String>,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct OrderBackendState {
    received: Vec<ReceivedOrder>,
    failures_left: usize,
    order_id: String,
}

/// Handle on a fake order backend.
#[derive(Clone)]
pub struct OrderBackend {
    state: Arc<Mutex<OrderBackendState>>,
}

impl OrderBackend {
    /// A backend that fails the first `failures` requests with 503, then
    /// answers `{"orderId": order_id}`.
    pub fn new(order_id: &str, failures: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(OrderBackendState {
                received: Vec::new(),
                failures_left: failures,
                order_id: order_id.to_string(),
            })),
        }
    }

    pub fn received(&self) -> Vec<ReceivedOrder> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .received
            .clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/animeTribes/orders", post(create_order))
            .with_state(self.clone())
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn create_order(
    State(backend): State<OrderBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = backend
        .state
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    state.received.push(ReceivedOrder {
        idempotency_key: header(&headers, "idempotency-key"),
        authorization: header(&headers, "authorization"),
        body,
    });

    if state.failures_left > 0 {
        state.failures_left -= 1;
        return (StatusCode::SERVICE_UNAVAILABLE, "backend busy").into_response();
    }
    Json(json!({ "orderId": state.order_id })).into_response()
}

// ============================================================================
// Fake slug backend
// ============================================================================

/// Slug that makes the fake backend answer 500.
pub const FAILING_SLUG: &str = "explode";

/// A backend knowing `taken` as existing product slugs.
pub fn slug_backend(taken: &[&str]) -> Router {
    let taken: Arc<BTreeSet<String>> = Arc::new(taken.iter().map(|s| (*s).to_string()).collect());
    Router::new()
        .route(
            "/api/animeTribes/products/check-slug/{slug}",
            get(check_slug),
        )
        .with_state(taken)
}

async fn check_slug(
    State(taken): State<Arc<BTreeSet<String>>>,
    Path(slug): Path<String>,
) -> Response {
    if slug == FAILING_SLUG {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database down").into_response();
    }
    Json(json!({ "exists": taken.contains(&slug) })).into_response()
}
