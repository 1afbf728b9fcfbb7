//! Order finalization.
//!
//! The checkout flow hands a completed [`OrderRequest`] to an
//! [`OrderGateway`] and gets back a [`PlacedOrder`]. Two gateways ship:
//!
//! - [`HttpOrderGateway`] posts the order to the backend API
//! - [`SimulatedOrderGateway`] waits and mints an order number locally, for
//!   demos and tests

mod http;
mod simulated;

pub use http::HttpOrderGateway;
pub use simulated::SimulatedOrderGateway;

use std::future::Future;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use anime_tribes_core::Email;

use crate::cart::CartLine;
use crate::checkout::{OrderSummary, PaymentSummary, ShippingAddress};

/// Errors that can occur while finalizing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The configured API token cannot be sent as a header.
    #[error("invalid API token: {0}")]
    InvalidToken(String),

    /// Backend answered with something that is not an order number.
    #[error("invalid order number: {0}")]
    InvalidOrderNumber(String),
}

/// An order reference, `ORD-` followed by six digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    const PREFIX: &'static str = "ORD-";

    /// Mint a random order number in `ORD-100000..=ORD-999999`.
    #[must_use]
    pub fn generate() -> Self {
        let n: u32 = rand::rng().random_range(100_000..=999_999);
        Self(format!("{}{n}", Self::PREFIX))
    }

    /// Validate an order number received from elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidOrderNumber`] unless the input is `ORD-`
    /// followed by exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OrderError> {
        let digits = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| OrderError::InvalidOrderNumber(s.to_owned()))?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderError::InvalidOrderNumber(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the order tracking page for this order.
    #[must_use]
    pub fn tracking_path(&self) -> String {
        format!("/track-order?id={}", self.0)
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderContact {
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Everything the backend needs to create an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub contact: OrderContact,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentSummary,
    pub lines: Vec<CartLine>,
    pub summary: OrderSummary,
}

/// A successfully created order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_number: OrderNumber,
    pub placed_at: DateTime<Utc>,
}

/// The external order collaborator.
pub trait OrderGateway {
    /// Create an order.
    ///
    /// `attempt_key` identifies the checkout attempt so a backend can
    /// de-duplicate resubmissions.
    fn create_order(
        &self,
        order: &OrderRequest,
        attempt_key: &str,
    ) -> impl Future<Output = Result<PlacedOrder, OrderError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_numbers_are_well_formed() {
        for _ in 0..100 {
            let number = OrderNumber::generate();
            assert!(OrderNumber::parse(number.as_str()).is_ok(), "{number}");
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(OrderNumber::parse("ORD-12345").is_err());
        assert!(OrderNumber::parse("ORD-1234567").is_err());
        assert!(OrderNumber::parse("ORD-12a456").is_err());
        assert!(OrderNumber::parse("123456").is_err());
    }

    #[test]
    fn test_tracking_path() {
        let number = OrderNumber::parse("ORD-654321").unwrap();
        assert_eq!(number.tracking_path(), "/track-order?id=ORD-654321");
    }

    #[test]
    fn test_order_number_deserialize_validates() {
        assert!(serde_json::from_str::<OrderNumber>("\"ORD-1\"").is_err());
        let number: OrderNumber = serde_json::from_str("\"ORD-100000\"").unwrap();
        assert_eq!(number.as_str(), "ORD-100000");
    }
}
