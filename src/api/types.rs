//! Request and response bodies specific to the upstream API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::{OrderStatus, Product};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

/// `GET /api/products` response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPage {
    pub data: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub total_products: u64,
    pub total_users: u64,
    pub pending_orders: u64,
    pub low_stock_products: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct BatchRequest<'a> {
    pub ids: &'a [String],
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct StockPatch {
    pub stock: u32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusUpdate<'a> {
    pub order_id: &'a str,
    pub status: OrderStatus,
}
