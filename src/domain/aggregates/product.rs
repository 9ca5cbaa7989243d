//! Product Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::domain::form::FieldErrors;
use crate::domain::value_objects::StockLevel;

/// Threshold used when a product carries no `minimumStock`.
pub const DEFAULT_MINIMUM_STOCK: u32 = 10;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub price: Decimal,
    pub mrp: Decimal,
    pub discount: Decimal,
    #[serde(deserialize_with = "lenient_count")]
    pub stock: u32,
    #[serde(deserialize_with = "lenient_optional_count", skip_serializing_if = "Option::is_none")]
    pub minimum_stock: Option<u32>,
    pub category: String,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn minimum_stock(&self) -> u32 { self.minimum_stock.unwrap_or(DEFAULT_MINIMUM_STOCK) }
    pub fn stock_level(&self) -> StockLevel { StockLevel::new(self.stock) }
    pub fn is_low_stock(&self) -> bool { self.stock < self.minimum_stock() }
    pub fn is_out_of_stock(&self) -> bool { self.stock == 0 }
    pub fn stock_value(&self) -> Decimal { self.price * Decimal::from(self.stock) }

    /// Discount percentage, derived from `mrp` when the record does not carry one.
    pub fn discount_percent(&self) -> Decimal {
        if self.discount > Decimal::ZERO { return self.discount; }
        if self.mrp > self.price && self.mrp > Decimal::ZERO {
            return ((self.mrp - self.price) / self.mrp * Decimal::ONE_HUNDRED).round();
        }
        Decimal::ZERO
    }
}

/// Accepts any JSON number (or a numeric string, or null) and clamps it into `u32`.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(lenient_optional_count(deserializer)?.unwrap_or(0))
}

fn lenient_optional_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    // float-to-int `as` saturates, so negatives land on 0
    Ok(number.map(|n| n.floor() as u32))
}

/// Form order of the admin product fields.
const PRODUCT_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("price", "price"),
    ("mrp", "mrp"),
    ("discount", "discount"),
    ("stock", "stock"),
    ("category", "category"),
    ("brand", "brand"),
];

/// Admin create/update payload, submitted upstream as-is once it validates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductForm {
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrp: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_stock: Option<u32>,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "Brand is required"))]
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
}

impl ProductForm {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self.brand = self.brand.trim().to_string();
        self.images.retain(|i| !i.trim().is_empty());
        self
    }

    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = self.validate().err().map(|e| FieldErrors::from_validation(&e, PRODUCT_FIELDS)).unwrap_or_default();
        if self.price <= Decimal::ZERO { errors.push("price", "Price must be greater than 0"); }
        if self.mrp.is_some_and(|mrp| mrp < self.price) { errors.push("mrp", "MRP cannot be lower than the selling price"); }
        if self.discount.is_some_and(|d| d < Decimal::ZERO || d > Decimal::ONE_HUNDRED) { errors.push("discount", "Discount must be between 0 and 100"); }
        errors.order_by(PRODUCT_FIELDS);
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
