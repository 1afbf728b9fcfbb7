//! Cart line types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use anime_tribes_core::{Money, ProductId};

/// One purchasable selection in the cart: a product, an optional size and
/// color, and how many of it.
///
/// Stored as `{id, name, price, image?, images?, quantity, selectedSize?,
/// selectedColor?}` with `price` as a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product identity.
    #[serde(rename = "id")]
    pub product_id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Unit price.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Money,
    /// Primary image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Gallery image URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Units of this selection. Always at least 1 inside the store.
    pub quantity: u32,
    /// Chosen size, if the product has sizes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    /// Chosen color, if the product has colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
}

impl CartLine {
    /// A line with no variant selection and no images.
    #[must_use]
    pub fn new(product_id: ProductId, name: impl Into<String>, price: Money, quantity: u32) -> Self {
        Self {
            product_id,
            name: name.into(),
            price,
            image: None,
            images: None,
            quantity,
            selected_size: None,
            selected_color: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = Some(size.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.selected_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    /// The identity used to merge and address lines.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            size: self.selected_size.clone(),
            color: self.selected_color.clone(),
        }
    }

    /// Whether this line is the same selection as `key`.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id
            && self.selected_size == key.size
            && self.selected_color == key.color
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price * Decimal::from(self.quantity)
    }
}

/// Identity of a cart line: product plus both variant discriminators.
///
/// An absent size only matches another absent size; same for color.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl LineKey {
    /// Key for a product without variant choices.
    #[must_use]
    pub const fn product(product_id: ProductId) -> Self {
        Self {
            product_id,
            size: None,
            color: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}
