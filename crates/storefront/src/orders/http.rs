//! Backend order API client.

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use super::{OrderError, OrderGateway, OrderNumber, OrderRequest, PlacedOrder};
use crate::config::BackendConfig;

/// Path of the order creation endpoint, relative to the backend base URL.
const ORDERS_PATH: &str = "api/animeTribes/orders";

/// Response body of a successful order creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResponse {
    order_id: String,
}

/// Creates orders through the backend HTTP API.
#[derive(Clone)]
pub struct HttpOrderGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOrderGateway {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns error if the API token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, OrderError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| OrderError::InvalidToken(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint(ORDERS_PATH),
        })
    }
}

impl OrderGateway for HttpOrderGateway {
    #[instrument(skip(self, order), fields(lines = order.lines.len()))]
    async fn create_order(
        &self,
        order: &OrderRequest,
        attempt_key: &str,
    ) -> Result<PlacedOrder, OrderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Idempotency-Key", attempt_key)
            .json(order)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CreateOrderResponse = response.json().await?;
        let order_number = OrderNumber::parse(&body.order_id)?;

        tracing::info!(order = %order_number, "Order created");

        Ok(PlacedOrder {
            order_number,
            placed_at: Utc::now(),
        })
    }
}
