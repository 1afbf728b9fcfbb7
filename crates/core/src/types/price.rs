//! Money amounts.
//!
//! Prices are plain `Decimal` dollar amounts; the catalog is single-currency.

use rust_decimal::{Decimal, RoundingStrategy};

/// A dollar amount.
pub type Money = Decimal;

/// Format an amount for display, e.g. `$59.98`.
#[must_use]
pub fn format_money(amount: Money) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2}")
}
