//! Domain events, published to NATS when a connection is configured

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::aggregates::OrderStatus;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProductEvent {
    StockAdjusted { product_id: String, previous_stock: u32, new_stock: u32, at: DateTime<Utc> },
    Saved { product_id: String },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: String, total: Decimal, local: bool },
    StatusChanged { order_id: String, from: OrderStatus, to: OrderStatus },
}

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Product(ProductEvent::StockAdjusted { .. }) => "optica.stock.adjusted",
            Self::Product(ProductEvent::Saved { .. }) => "optica.product.saved",
            Self::Order(OrderEvent::Placed { .. }) => "optica.order.placed",
            Self::Order(OrderEvent::StatusChanged { .. }) => "optica.order.status_changed",
        }
    }
}

/// Fire-and-forget publisher; without a client every event is dropped.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }
    pub fn disabled() -> Self { Self::default() }
    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    pub async fn publish(&self, event: DomainEvent) {
        let Some(nats) = &self.nats else { return };
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => { tracing::warn!(error = %e, subject = event.subject(), "failed to encode event"); return; }
        };
        if let Err(e) = nats.publish(event.subject().to_string(), payload.into()).await {
            tracing::warn!(error = %e, subject = event.subject(), "failed to publish event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_shape() {
        let event = DomainEvent::Order(OrderEvent::StatusChanged { order_id: "ORD1".into(), from: OrderStatus::Pending, to: OrderStatus::Shipped });
        assert_eq!(event.subject(), "optica.order.status_changed");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "order");
        assert_eq!(json["event"], "status_changed");
        assert_eq!(json["to"], "shipped");
    }

    #[tokio::test]
    async fn test_disabled_publisher_is_noop() {
        let publisher = EventPublisher::disabled();
        assert!(!publisher.is_enabled());
        publisher.publish(DomainEvent::Product(ProductEvent::Saved { product_id: "p1".into() })).await;
    }
}
