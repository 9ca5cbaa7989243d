//! Admin orders view.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::matches_search;
use crate::domain::aggregates::{Order, OrderStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    #[default]
    All,
    /// Same UTC calendar day as `now`.
    Today,
    /// Last 7 days, up to `now`.
    Week,
    /// Last 30 days, up to `now`.
    Month,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Today => at.date_naive() == now.date_naive(),
            Self::Week => at >= now - Duration::days(7) && at <= now,
            Self::Month => at >= now - Duration::days(30) && at <= now,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderSort {
    #[default]
    Newest,
    Oldest,
    TotalDesc,
    TotalAsc,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderFilter {
    pub search: String,
    pub status: Option<OrderStatus>,
    pub date_range: DateRange,
    pub sort: OrderSort,
}

pub fn filter_orders<'a>(orders: &'a [Order], filter: &OrderFilter, now: DateTime<Utc>) -> Vec<&'a Order> {
    let mut view: Vec<&Order> = orders
        .iter()
        .filter(|o| {
            let a = &o.shipping_address;
            matches_search(&filter.search, [o.number(), a.full_name.as_str(), a.phone.as_str(), o.contact_email().unwrap_or_default()])
        })
        .filter(|o| filter.status.map_or(true, |s| o.status == s))
        .filter(|o| filter.date_range.contains(o.created_at, now))
        .collect();
    match filter.sort {
        OrderSort::Newest => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        OrderSort::Oldest => view.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        OrderSort::TotalDesc => view.sort_by(|a, b| b.total.cmp(&a.total)),
        OrderSort::TotalAsc => view.sort_by(|a, b| a.total.cmp(&b.total)),
    }
    view
}

/// Orders per status; every status is present, zero when unused.
pub fn status_counts(orders: &[Order]) -> BTreeMap<OrderStatus, usize> {
    let mut counts: BTreeMap<OrderStatus, usize> = OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
    for o in orders {
        *counts.entry(o.status).or_default() += 1;
    }
    counts
}
