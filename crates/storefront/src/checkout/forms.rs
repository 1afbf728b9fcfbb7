//! Checkout form data and field validation.

use serde::{Deserialize, Serialize};

use anime_tribes_core::Email;

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    /// Required but empty.
    Missing,
    /// Present but malformed.
    Invalid(String),
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub problem: FieldProblem,
}

/// Every problem found in one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record `field` as missing if `value` is blank.
    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.0.push(FieldError {
                field,
                problem: FieldProblem::Missing,
            });
        }
    }

    pub fn invalid(&mut self, field: &'static str, reason: impl Into<String>) {
        self.0.push(FieldError {
            field,
            problem: FieldProblem::Invalid(reason.into()),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Names of the fields that were left empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.0
            .iter()
            .filter(|e| e.problem == FieldProblem::Missing)
            .map(|e| e.field)
            .collect()
    }

    /// Whether `field` was rejected for any reason.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field was rejected.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            write!(f, "please fill in all required fields ({})", missing.join(", "))?;
        }
        for (i, error) in self
            .0
            .iter()
            .filter_map(|e| match &e.problem {
                FieldProblem::Invalid(reason) => Some((e.field, reason)),
                FieldProblem::Missing => None,
            })
            .enumerate()
        {
            if i > 0 || !missing.is_empty() {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.0, error.1)?;
        }
        Ok(())
    }
}

/// Guest contact details collected after phone verification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl PersonalInfo {
    /// Check required fields and parse the email.
    pub(crate) fn validate(&self) -> Result<Email, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("firstName", &self.first_name);
        errors.require("lastName", &self.last_name);
        errors.require("email", &self.email);

        let email = if self.email.trim().is_empty() {
            None
        } else {
            match Email::parse(&self.email) {
                Ok(email) => Some(email),
                Err(e) => {
                    errors.invalid("email", e.to_string());
                    None
                }
            }
        };

        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }

    /// "First Last", trimmed.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_owned()
    }
}

/// Where the order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Country preselected on a fresh form.
    pub const DEFAULT_COUNTRY: &'static str = "United States";

    /// Countries offered by the address form.
    pub const COUNTRIES: [&'static str; 6] = [
        "United States",
        "Canada",
        "United Kingdom",
        "Australia",
        "Germany",
        "France",
    ];

    /// An empty form, optionally prefilled with the shopper's name.
    #[must_use]
    pub fn blank(full_name: Option<&str>) -> Self {
        Self {
            full_name: full_name.unwrap_or_default().trim().to_owned(),
            address_line1: String::new(),
            address_line2: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: Self::DEFAULT_COUNTRY.to_owned(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("fullName", &self.full_name);
        errors.require("addressLine1", &self.address_line1);
        errors.require("city", &self.city);
        errors.require("state", &self.state);
        errors.require("zipCode", &self.zip_code);
        errors.require("country", &self.country);
        errors.into_result()
    }
}
