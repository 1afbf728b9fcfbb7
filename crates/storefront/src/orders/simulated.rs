//! Local stand-in for the order backend.

use std::time::Duration;

use chrono::Utc;

use super::{OrderError, OrderGateway, OrderNumber, OrderRequest, PlacedOrder};

/// Pretends to place orders: waits `delay`, then mints an order number.
#[derive(Debug, Clone)]
pub struct SimulatedOrderGateway {
    delay: Duration,
}

impl SimulatedOrderGateway {
    /// Default processing delay.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A gateway that answers immediately.
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Default for SimulatedOrderGateway {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

impl OrderGateway for SimulatedOrderGateway {
    async fn create_order(
        &self,
        order: &OrderRequest,
        attempt_key: &str,
    ) -> Result<PlacedOrder, OrderError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let order_number = OrderNumber::generate();
        tracing::debug!(
            order = %order_number,
            attempt = attempt_key,
            lines = order.lines.len(),
            "Simulated order placed"
        );

        Ok(PlacedOrder {
            order_number,
            placed_at: Utc::now(),
        })
    }
}
