//! Order pricing.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use anime_tribes_core::{Money, format_money};

use crate::cart::CartLine;

/// Subtotals above this ship for free.
const FREE_SHIPPING_THRESHOLD: Money = Decimal::from_parts(100, 0, 0, false, 0);

/// Flat shipping charge below the threshold.
const FLAT_SHIPPING: Money = Decimal::from_parts(10, 0, 0, false, 0);

/// Sales tax rate, 8%.
const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Price breakdown shown next to the checkout steps and sent with the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Money,
}

impl OrderSummary {
    /// Price a set of cart lines.
    #[must_use]
    pub fn compute(lines: &[CartLine]) -> Self {
        let subtotal: Money = lines.iter().map(CartLine::line_total).sum();

        let shipping = if lines.is_empty() || subtotal > FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING
        };
        let tax = (subtotal * TAX_RATE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    #[must_use]
    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

impl std::fmt::Display for OrderSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shipping = if self.free_shipping() {
            "Free".to_owned()
        } else {
            format_money(self.shipping)
        };
        writeln!(f, "Subtotal  {}", format_money(self.subtotal))?;
        writeln!(f, "Shipping  {shipping}")?;
        writeln!(f, "Tax       {}", format_money(self.tax))?;
        write!(f, "Total     {}", format_money(self.total))
    }
}
