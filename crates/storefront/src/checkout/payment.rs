//! Payment methods.
//!
//! Card numbers and CVVs are held as secrets and never leave the process;
//! the backend only receives a [`PaymentSummary`].

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::forms::ValidationErrors;

/// Digits in an accepted card number.
const CARD_NUMBER_DIGITS: usize = 16;

/// Minimum CVV length.
const MIN_CVV_DIGITS: usize = 3;

/// Card details as typed into the payment form.
#[derive(Debug, Clone)]
pub struct CardDetails {
    /// Card number, spaces allowed.
    pub number: SecretString,
    /// Name on the card.
    pub holder_name: String,
    /// Expiry as entered, e.g. `08/27`.
    pub expiry: String,
    pub cvv: SecretString,
}

/// How the shopper pays.
#[derive(Debug, Clone)]
pub enum PaymentMethod {
    CreditCard(CardDetails),
    /// Completed off-site after the order is placed; no fields to collect.
    DigitalWallet,
}

impl PaymentMethod {
    /// Validate the method's fields.
    ///
    /// # Errors
    ///
    /// Returns every missing or malformed card field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Self::DigitalWallet => Ok(()),
            Self::CreditCard(card) => card.validate(),
        }
    }

    /// What the backend is told about this payment.
    #[must_use]
    pub fn summary(&self) -> PaymentSummary {
        match self {
            Self::DigitalWallet => PaymentSummary {
                method: PaymentKind::DigitalWallet,
                card_holder: None,
                card_last4: None,
                card_expiry: None,
            },
            Self::CreditCard(card) => {
                let digits = normalize_card_number(card.number.expose_secret());
                let last4 = digits
                    .get(digits.len().saturating_sub(4)..)
                    .map(str::to_owned);
                PaymentSummary {
                    method: PaymentKind::CreditCard,
                    card_holder: Some(card.holder_name.trim().to_owned()),
                    card_last4: last4,
                    card_expiry: Some(card.expiry.trim().to_owned()),
                }
            }
        }
    }
}

impl CardDetails {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let number = self.number.expose_secret();
        let cvv = self.cvv.expose_secret();

        let mut errors = ValidationErrors::new();
        errors.require("cardNumber", number);
        errors.require("cardName", &self.holder_name);
        errors.require("expiryDate", &self.expiry);
        errors.require("cvv", cvv);
        if !errors.is_empty() {
            return Err(errors);
        }

        let digits = normalize_card_number(number);
        if digits.len() != CARD_NUMBER_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            errors.invalid("cardNumber", "please enter a valid 16-digit card number");
        }
        let cvv = cvv.trim();
        if cvv.len() < MIN_CVV_DIGITS || !cvv.bytes().all(|b| b.is_ascii_digit()) {
            errors.invalid("cvv", "please enter a valid CVV code");
        }
        errors.into_result()
    }
}

/// Payment method tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentKind {
    CreditCard,
    DigitalWallet,
}

/// Non-sensitive description of a payment, sent with the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub method: PaymentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_expiry: Option<String>,
}

/// Strip whitespace from a card number.
#[must_use]
pub fn normalize_card_number(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Format card number input in groups of four, keeping at most 16 digits.
///
/// Input with fewer than four digits is returned unchanged.
#[must_use]
pub fn format_card_number(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(char::is_ascii_digit)
        .take(CARD_NUMBER_DIGITS)
        .collect();
    if digits.len() < 4 {
        return input.to_owned();
    }

    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format expiry input as `MM/YY` once at least three digits are typed.
#[must_use]
pub fn format_expiry(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).take(4).collect();
    if digits.len() >= 3 {
        let (month, year) = digits.split_at(2);
        format!("{month}/{year}")
    } else {
        input.to_owned()
    }
}
