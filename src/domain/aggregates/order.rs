//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::address_book::Address;
use crate::domain::aggregates::cart::{CartItem, CartTotals};
use crate::domain::value_objects::OrderNumber;

pub const DEFAULT_PAYMENT_METHOD: &str = "cod";

/// Serialized lowercase; parsed case-insensitively.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [Self::Pending, Self::Confirmed, Self::Processing, Self::Shipped, Self::Delivered, Self::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Delivered and cancelled orders accept no further status changes.
    pub fn is_terminal(&self) -> bool { matches!(self, Self::Delivered | Self::Cancelled) }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OrderStatus {
    type Err = OrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|st| st.as_str() == wanted).ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = OrderError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub items: Vec<CartItem>,
    pub shipping_address: Address,
    pub status: OrderStatus,
    pub payment_method: String,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Builds an order locally, used when the order service cannot be reached.
    pub fn local(draft: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            order_id: OrderNumber::local(now).into_inner(),
            user_id: draft.user_id,
            customer_email: draft.customer_email,
            items: draft.items,
            shipping_address: draft.shipping_address,
            status: OrderStatus::Pending,
            payment_method: draft.payment_method,
            subtotal: draft.subtotal,
            shipping: draft.shipping,
            tax: draft.tax,
            total: draft.total,
            created_at: now,
        }
    }

    /// The number shown to customers; falls back to the record id.
    pub fn number(&self) -> &str { if self.order_id.is_empty() { &self.id } else { &self.order_id } }
    pub fn customer_name(&self) -> &str { &self.shipping_address.full_name }
    pub fn contact_email(&self) -> Option<&str> {
        self.customer_email.as_deref().or(self.shipping_address.email.as_deref()).filter(|e| !e.is_empty())
    }
    pub fn item_count(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }

    /// Moves the order to `next`, returning the previous status.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        if self.status == next { return Err(OrderError::Unchanged(next)); }
        if self.status.is_terminal() { return Err(OrderError::Terminal(self.status)); }
        Ok(std::mem::replace(&mut self.status, next))
    }
}

/// Body of `POST /api/orders`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub items: Vec<CartItem>,
    pub shipping_address: Address,
    pub payment_method: String,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl NewOrder {
    pub fn new(items: Vec<CartItem>, totals: CartTotals, shipping_address: Address, payment_method: impl Into<String>) -> Self {
        Self {
            user_id: None,
            customer_email: None,
            items,
            shipping_address,
            payment_method: payment_method.into(),
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            tax: totals.tax,
            total: totals.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
    #[error("Order is already {0}")]
    Unchanged(OrderStatus),
    #[error("A {0} order can no longer change status")]
    Terminal(OrderStatus),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" cancelled ".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!(matches!("lost".parse::<OrderStatus>(), Err(OrderError::UnknownStatus(_))));
        assert_eq!(serde_json::to_value(OrderStatus::Processing).unwrap(), "processing");
    }

    #[test]
    fn test_status_wire_format_is_case_insensitive() {
        let order: Order = serde_json::from_value(serde_json::json!({"orderId": "ORD1", "status": "Shipped"})).unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert!(serde_json::from_value::<OrderStatus>(serde_json::json!("lost")).is_err());
    }

    #[test]
    fn test_order_workflow() {
        let mut order = Order::default();
        assert_eq!(order.transition_to(OrderStatus::Confirmed).unwrap(), OrderStatus::Pending);
        assert_eq!(order.transition_to(OrderStatus::Confirmed), Err(OrderError::Unchanged(OrderStatus::Confirmed)));
        order.transition_to(OrderStatus::Shipped).unwrap();
        order.transition_to(OrderStatus::Delivered).unwrap();
        assert_eq!(order.transition_to(OrderStatus::Cancelled), Err(OrderError::Terminal(OrderStatus::Delivered)));
    }

    #[test]
    fn test_local_order_from_draft() {
        let totals = CartTotals::for_subtotal(Decimal::new(25, 0));
        let draft = NewOrder::new(vec![], totals, Address::default(), DEFAULT_PAYMENT_METHOD);
        let now = Utc::now();
        let order = Order::local(draft, now);
        assert_eq!(order.order_id, format!("ORD{}", now.timestamp_millis()));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Decimal::new(375, 1));
        assert!(!order.id.is_empty());
    }

    #[test]
    fn test_wire_format_tolerates_partial_records() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "65f0", "status": "shipped", "total": 120,
            "shippingAddress": {"fullName": "Asha", "email": "asha@example.com"},
            "createdAt": "2024-05-01T10:00:00Z"
        })).unwrap();
        assert_eq!(order.number(), "65f0");
        assert_eq!(order.customer_name(), "Asha");
        assert_eq!(order.contact_email(), Some("asha@example.com"));
        assert_eq!(order.status, OrderStatus::Shipped);
    }
}
