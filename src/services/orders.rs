//! Customer order history and the admin order desk.

use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::api::BackendClient;
use crate::domain::aggregates::{Order, OrderStatus};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::notify::email::{order_status_email, Audience};
use crate::state::AppState;
use crate::store::ClientState;
use crate::views::orders::{filter_orders, status_counts, OrderFilter};
use crate::views::{paginate, Page, PageRequest};
use crate::{Result, StoreError};

use super::session::{current, require_admin};
use super::upstream;

/// Remote orders first, then local ones the order service does not know
/// about, newest first.
fn merge_history(remote: Vec<Order>, local: Vec<Order>) -> Vec<Order> {
    let known: HashSet<String> = remote.iter().map(|o| o.number().to_string()).collect();
    let mut merged = remote;
    merged.extend(local.into_iter().filter(|o| !known.contains(o.number())));
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}

/// The signed-in customer's orders. When the order service is down only the
/// locally recorded orders are returned.
pub async fn customer_orders(app: &AppState, client: &ClientState) -> Result<Vec<Order>> {
    let session = current(client).await?;
    let local = client.user_orders(&session.user.id).await?;
    let remote = match app.api.with_token(&session.token).list_orders(Some(&session.user.id)).await {
        Err(e) if !e.is_unauthorized() => {
            tracing::warn!(error = %e, user_id = %session.user.id, "order history unavailable, using local orders");
            Vec::new()
        }
        result => upstream(client, result).await?,
    };
    Ok(merge_history(remote, local))
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDesk {
    pub page: Page<Order>,
    pub status_counts: BTreeMap<OrderStatus, usize>,
}

pub async fn admin_orders(app: &AppState, client: &ClientState, filter: &OrderFilter, page: PageRequest) -> Result<OrderDesk> {
    let session = require_admin(client).await?;
    let orders = upstream(client, app.api.with_token(&session.token).list_orders(None).await).await?;
    let counts = status_counts(&orders);
    let view = filter_orders(&orders, filter, Utc::now());
    let page = paginate(view, page).map(Order::clone);
    Ok(OrderDesk { page, status_counts: counts })
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub order: Order,
    pub previous: OrderStatus,
    pub email_sent: bool,
}

/// Moves an order to `status`. `order_id` matches either the order number or
/// the record id. With `notify` the customer is emailed; a failed email is
/// logged and reported through `email_sent`.
pub async fn update_status(app: &AppState, client: &ClientState, order_id: &str, status: OrderStatus, notify: bool) -> Result<StatusChange> {
    let session = require_admin(client).await?;
    let api = app.api.with_token(&session.token);
    let orders = upstream(client, api.list_orders(None).await).await?;
    let mut order = orders
        .into_iter()
        .find(|o| o.number() == order_id || o.id == order_id)
        .ok_or_else(|| StoreError::NotFound(format!("Order {order_id}")))?;

    let previous = order.transition_to(status)?;
    upstream(client, api.update_order_status(order.number(), status).await).await?;
    tracing::info!(order = %order.number(), from = %previous, to = %status, "order status changed");

    let email_sent = notify && send_status_email(app, &api, &order, status).await;
    app.events
        .publish(DomainEvent::Order(OrderEvent::StatusChanged { order_id: order.number().to_string(), from: previous, to: status }))
        .await;

    Ok(StatusChange { order, previous, email_sent })
}

async fn send_status_email(app: &AppState, api: &BackendClient, order: &Order, status: OrderStatus) -> bool {
    let message = match order_status_email(&app.config.store_name, order, status) {
        Ok(Some(m)) => m,
        Ok(None) => {
            tracing::info!(order = %order.number(), "order has no contact email, skipping notification");
            return false;
        }
        Err(e) => { tracing::warn!(error = %e, "failed to render status email"); return false; }
    };
    match api.send_email(Audience::Admin, &message).await {
        Ok(()) => true,
        Err(e) => { tracing::warn!(error = %e, order = %order.number(), "failed to send status email"); false }
    }
}
