//! Cart commands.

use anime_tribes_core::{Money, ProductId, format_money};
use anime_tribes_storefront::cart::{CartError, CartLine, CartStore, LineKey};
use anime_tribes_storefront::checkout::OrderSummary;
use tracing::info;

use crate::storage::FileStorage;

pub fn open(storage: FileStorage) -> CartStore<FileStorage> {
    CartStore::open(storage)
}

/// Build a line from command arguments.
pub fn line(
    product_id: ProductId,
    name: String,
    price: Money,
    quantity: u32,
    size: Option<String>,
    color: Option<String>,
) -> CartLine {
    let mut line = CartLine::new(product_id, name, price, quantity);
    if let Some(size) = size {
        line = line.with_size(size);
    }
    if let Some(color) = color {
        line = line.with_color(color);
    }
    line
}

pub fn key(id: u32, size: Option<String>, color: Option<String>) -> LineKey {
    let mut key = LineKey::product(ProductId::new(id));
    if let Some(size) = size {
        key = key.with_size(size);
    }
    if let Some(color) = color {
        key = key.with_color(color);
    }
    key
}

pub fn add(cart: &mut CartStore<FileStorage>, line: CartLine) -> Result<(), CartError> {
    let name = line.name.clone();
    let quantity = line.quantity;
    cart.add(line)?;
    info!("Added {quantity} x {name}; cart has {} items", cart.count());
    Ok(())
}

pub fn remove(cart: &mut CartStore<FileStorage>, key: &LineKey) -> Result<(), CartError> {
    if cart.get(key).is_none() {
        info!("No such line in the cart");
        return Ok(());
    }
    cart.remove(key)?;
    info!("Removed; cart has {} items", cart.count());
    Ok(())
}

pub fn set_quantity(
    cart: &mut CartStore<FileStorage>,
    key: &LineKey,
    quantity: u32,
) -> Result<(), CartError> {
    cart.update_quantity(key, quantity)?;
    info!("Cart has {} items", cart.count());
    Ok(())
}

pub fn clear(cart: &mut CartStore<FileStorage>) -> Result<(), CartError> {
    cart.clear()?;
    info!("Cart cleared");
    Ok(())
}

pub fn show(cart: &CartStore<FileStorage>) {
    if cart.is_empty() {
        info!("Your cart is empty");
        return;
    }

    for line in cart.lines() {
        info!("{}", describe(line));
    }

    let summary = OrderSummary::compute(cart.lines());
    info!("Subtotal: {}", format_money(summary.subtotal));
    if summary.free_shipping() {
        info!("Shipping: Free");
    } else {
        info!("Shipping: {}", format_money(summary.shipping));
    }
    info!("Tax:      {}", format_money(summary.tax));
    info!("Total:    {}", format_money(summary.total));
}

fn describe(line: &CartLine) -> String {
    let mut variant = Vec::new();
    if let Some(size) = &line.selected_size {
        variant.push(format!("size {size}"));
    }
    if let Some(color) = &line.selected_color {
        variant.push(format!("color {color}"));
    }
    let variant = if variant.is_empty() {
        String::new()
    } else {
        format!(" [{}]", variant.join(", "))
    };

    format!(
        "#{} {}{variant}: {} x {} = {}",
        line.product_id,
        line.name,
        line.quantity,
        format_money(line.price),
        format_money(line.line_total())
    )
}
