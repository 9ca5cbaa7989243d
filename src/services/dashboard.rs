//! Admin dashboard snapshot and the background pollers that keep it and the
//! product snapshot fresh.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::api::{ApiError, BackendClient, DashboardStats};
use crate::domain::aggregates::{Order, OrderStatus, Product};
use crate::state::{is_fresh, AppState};
use crate::store::ClientState;
use crate::views::orders::status_counts;
use crate::Result;

use super::session::require_admin;
use super::upstream;

pub const RECENT_ORDERS: usize = 5;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub recent_orders: Vec<Order>,
    pub low_stock: Vec<Product>,
    pub order_counts: BTreeMap<OrderStatus, usize>,
    pub last_updated: DateTime<Utc>,
}

impl DashboardSnapshot {
    fn build(stats: DashboardStats, mut orders: Vec<Order>, products: &[Product], at: DateTime<Utc>) -> Self {
        let order_counts = status_counts(&orders);
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(RECENT_ORDERS);
        let mut low_stock: Vec<Product> = products.iter().filter(|p| p.is_low_stock()).cloned().collect();
        low_stock.sort_by_key(|p| p.stock);
        Self { stats, recent_orders: orders, low_stock, order_counts, last_updated: at }
    }
}

/// Fetches stats, orders and products together. Nothing is stored unless all
/// three succeed; on success both snapshots are replaced.
pub async fn refresh(app: &AppState, api: &BackendClient) -> std::result::Result<DashboardSnapshot, ApiError> {
    let (stats, orders, products) = tokio::try_join!(api.admin_stats(), api.list_orders(None), api.all_products())?;
    let snapshot = DashboardSnapshot::build(stats, orders, &products, Utc::now());
    app.snapshots.store_products(products).await;
    *app.snapshots.dashboard.write().await = Some(snapshot.clone());
    Ok(snapshot)
}

/// The last snapshot while it is younger than the dashboard poll period,
/// else a fresh one fetched with the admin's token.
pub async fn dashboard(app: &AppState, client: &ClientState) -> Result<DashboardSnapshot> {
    let session = require_admin(client).await?;
    let cached = app.snapshots.dashboard.read().await.clone();
    if let Some(snapshot) = cached.filter(|s| is_fresh(s.last_updated, app.config.dashboard_poll)) {
        return Ok(snapshot);
    }
    upstream(client, refresh(app, &app.api.with_token(&session.token)).await).await
}

/// A background task, aborted when dropped.
#[derive(Debug)]
pub struct Poller(JoinHandle<()>);

impl Drop for Poller {
    fn drop(&mut self) { self.0.abort(); }
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Refreshes the dashboard every `period`. A failed refresh keeps the
/// previous snapshot.
pub fn spawn_dashboard_poller(app: AppState, api: BackendClient, period: Duration) -> Poller {
    Poller(tokio::spawn(async move {
        let mut ticker = ticker(period);
        loop {
            ticker.tick().await;
            match refresh(&app, &api).await {
                Ok(s) => tracing::debug!(orders = s.stats.total_orders, low_stock = s.low_stock.len(), "dashboard refreshed"),
                Err(e) => tracing::warn!(error = %e, "dashboard refresh failed"),
            }
        }
    }))
}

/// Reloads the product snapshot every `period`.
pub fn spawn_catalog_poller(app: AppState, api: BackendClient, period: Duration) -> Poller {
    Poller(tokio::spawn(async move {
        let mut ticker = ticker(period);
        loop {
            ticker.tick().await;
            match api.all_products().await {
                Ok(products) => {
                    tracing::debug!(count = products.len(), "product snapshot refreshed");
                    app.snapshots.store_products(products).await;
                }
                Err(e) => tracing::warn!(error = %e, "product snapshot refresh failed"),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as Span, TimeZone};

    #[test]
    fn test_snapshot_keeps_five_newest_orders() {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let orders: Vec<Order> = (0..8)
            .map(|i| Order { order_id: format!("ORD{i}"), status: if i % 2 == 0 { OrderStatus::Pending } else { OrderStatus::Shipped }, created_at: base + Span::hours(i), ..Order::default() })
            .collect();
        let products = vec![
            Product { id: "a".into(), stock: 3, ..Product::default() },
            Product { id: "b".into(), stock: 40, ..Product::default() },
            Product { id: "c".into(), stock: 0, ..Product::default() },
        ];
        let snapshot = DashboardSnapshot::build(DashboardStats::default(), orders, &products, base);
        let numbers: Vec<_> = snapshot.recent_orders.iter().map(Order::number).collect();
        assert_eq!(numbers, ["ORD7", "ORD6", "ORD5", "ORD4", "ORD3"]);
        assert_eq!(snapshot.order_counts[&OrderStatus::Pending], 4);
        assert_eq!(snapshot.order_counts[&OrderStatus::Delivered], 0);
        let low: Vec<_> = snapshot.low_stock.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(low, ["c", "a"]);
    }
}
