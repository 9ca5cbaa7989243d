//! Inventory stock-change log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Entries kept in the log; older ones fall off.
pub const STOCK_HISTORY_CAPACITY: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockChange {
    pub id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub previous_stock: u32,
    pub new_stock: u32,
    /// The requested delta, which may exceed the applied one when stock clamps at zero.
    pub delta: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StockChange {
    pub fn new(product_id: impl Into<String>, product_name: impl Into<String>, previous_stock: u32, new_stock: u32, delta: i64, reason: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product_id.into(),
            product_name: product_name.into(),
            previous_stock,
            new_stock,
            delta,
            reason: reason.filter(|r| !r.trim().is_empty()),
            timestamp: Utc::now(),
        }
    }

    pub fn applied_delta(&self) -> i64 { i64::from(self.new_stock) - i64::from(self.previous_stock) }
}

/// Newest-first log of stock changes, capped at [`STOCK_HISTORY_CAPACITY`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockHistory {
    entries: VecDeque<StockChange>,
}

impl StockHistory {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &StockChange> { self.entries.iter() }
    pub fn latest(&self) -> Option<&StockChange> { self.entries.front() }

    pub fn push(&mut self, change: StockChange) {
        self.entries.push_front(change);
        self.entries.truncate(STOCK_HISTORY_CAPACITY);
    }

    pub fn for_product<'a>(&'a self, product_id: &'a str) -> impl Iterator<Item = &'a StockChange> + 'a {
        self.entries.iter().filter(move |c| c.product_id == product_id)
    }
}
