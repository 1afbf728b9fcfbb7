//! Newtype IDs for type-safe entity references.
//!
//! Products are keyed by the backend's numeric id, admins by an opaque
//! string handed out at login. Keeping them apart prevents passing an
//! admin id where a product id is expected.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a numeric ID wrapper.
///
/// Creates a newtype wrapper around `u32` that serializes as a bare JSON
/// number, with `new()`, `get()` and `From` conversions.
///
/// # Example
///
/// ```rust
/// # use anime_tribes_core::define_numeric_id;
/// define_numeric_id!(CategoryId);
///
/// let id = CategoryId::new(7);
/// assert_eq!(id.get(), 7);
/// ```
#[macro_export]
macro_rules! define_numeric_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a raw id.
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// The raw id.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_numeric_id!(ProductId);

/// Identifier of an admin account (e.g. `"admin-1"`, `"super-1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminId(String);

impl AdminId {
    /// Wrap an admin id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdminId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AdminId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_is_a_bare_number_on_the_wire() {
        let json = serde_json::to_string(&ProductId::new(42)).unwrap();
        assert_eq!(json, "42");
        let back: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(back.get(), 42);
    }

    #[test]
    fn test_admin_id_display() {
        assert_eq!(AdminId::from("super-1").to_string(), "super-1");
    }
}
