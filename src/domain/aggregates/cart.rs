//! Cart Aggregate

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flat shipping fee charged on small orders.
pub fn shipping_fee() -> Decimal { Decimal::new(10, 0) }
/// Subtotals at or below this amount pay [`shipping_fee`].
pub fn free_shipping_threshold() -> Decimal { Decimal::new(100, 0) }
/// Tax as a fraction of the subtotal (10%).
pub fn tax_rate() -> Decimal { Decimal::new(10, 2) }

fn default_quantity() -> u32 { 1 }

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal { self.price * Decimal::from(self.quantity) }
    pub fn key(&self) -> LineKey {
        LineKey { product_id: self.product_id.clone(), color: self.color.clone(), size: self.size.clone() }
    }
    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.color == key.color && self.size == key.size
    }
}

/// A cart line is identified by product, colour and size together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    #[serde(rename = "_id")]
    pub product_id: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    pub fn for_subtotal(subtotal: Decimal) -> Self {
        let shipping = if subtotal > Decimal::ZERO && subtotal <= free_shipping_threshold() { shipping_fee() } else { Decimal::ZERO };
        let tax = (subtotal * tax_rate()).round_dp(2);
        Self { subtotal, shipping, tax, total: subtotal + shipping + tax }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self { Self::default() }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn into_items(self) -> Vec<CartItem> { self.items }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    /// Number of units across all lines.
    pub fn item_count(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }

    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if item.quantity == 0 { return Err(CartError::InvalidQuantity); }
        let key = item.key();
        if let Some(existing) = self.items.iter_mut().find(|i| i.matches(&key)) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 { return self.remove_item(key); }
        let item = self.items.iter_mut().find(|i| i.matches(key)).ok_or(CartError::ItemNotFound)?;
        item.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, key: &LineKey) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| !i.matches(key));
        if self.items.len() == before { return Err(CartError::ItemNotFound); }
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); }

    /// Folds another cart's lines into this one, summing matching lines.
    pub fn merge(&mut self, other: Cart) {
        for item in other.items.into_iter().filter(|i| i.quantity > 0) {
            // quantity is non-zero, so add_item cannot fail
            let _ = self.add_item(item);
        }
    }

    pub fn subtotal(&self) -> Decimal { self.items.iter().map(CartItem::line_total).sum() }
    pub fn totals(&self) -> CartTotals { CartTotals::for_subtotal(self.subtotal()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Item not found in cart")]
    ItemNotFound,
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
}
