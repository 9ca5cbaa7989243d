use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use super::{Client, Reply};
use crate::domain::aggregates::{OrderStatus, Product, ProductForm, StockChange};
use crate::notify::Toast;
use crate::services::dashboard::{self, DashboardSnapshot};
use crate::services::inventory::{self, InventoryView, StockAdjustment};
use crate::services::orders::{self, OrderDesk, StatusChange};
use crate::state::AppState;
use crate::views::inventory::{InventoryFilter, InventorySort};
use crate::views::orders::{DateRange, OrderFilter, OrderSort};
use crate::views::{selection, PageRequest, DEFAULT_PAGE_SIZE};
use crate::Result;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/admin/dashboard", get(get_dashboard))
        .route("/api/v1/admin/inventory", get(get_inventory))
        .route("/api/v1/admin/inventory/history", get(get_stock_history))
        .route("/api/v1/admin/inventory/:id/adjust", post(adjust_stock))
        .route("/api/v1/admin/products", post(create_product))
        .route("/api/v1/admin/products/:id", put(update_product))
        .route("/api/v1/admin/orders", get(list_orders))
        .route("/api/v1/admin/orders/:id/status", put(update_order_status))
}

fn page(page: Option<usize>, per_page: Option<usize>) -> PageRequest {
    PageRequest { page: page.unwrap_or(1), per_page: per_page.unwrap_or(DEFAULT_PAGE_SIZE) }
}

async fn get_dashboard(State(s): State<AppState>, Client(c): Client) -> Result<Json<Reply<DashboardSnapshot>>> {
    Ok(Reply::new(dashboard::dashboard(&s, &c).await?))
}

// ----------------------------------------------------------------- inventory

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryParams {
    pub search: String,
    pub category: Option<String>,
    pub show_low_stock_only: bool,
    pub show_out_of_stock_only: bool,
    pub sort: InventorySort,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

async fn get_inventory(State(s): State<AppState>, Client(c): Client, Query(p): Query<InventoryParams>) -> Result<Json<Reply<InventoryView>>> {
    let filter = InventoryFilter {
        search: p.search,
        category: p.category,
        show_low_stock_only: p.show_low_stock_only,
        show_out_of_stock_only: p.show_out_of_stock_only,
        sort: p.sort,
    };
    Ok(Reply::new(inventory::inventory_view(&s, &c, &filter, page(p.page, p.per_page)).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryParams {
    pub product_id: Option<String>,
}

async fn get_stock_history(Client(c): Client, Query(p): Query<HistoryParams>) -> Result<Json<Reply<Vec<StockChange>>>> {
    Ok(Reply::new(inventory::stock_history(&c, selection(p.product_id.as_deref())).await?))
}

#[derive(Debug, Deserialize)]
pub struct AdjustBody {
    pub delta: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

async fn adjust_stock(State(s): State<AppState>, Client(c): Client, Path(id): Path<String>, Json(b): Json<AdjustBody>) -> Result<Json<Reply<StockAdjustment>>> {
    let adjustment = inventory::adjust_stock(&s, &c, &id, b.delta, b.reason).await?;
    let toast = Toast::success(format!("Stock for {} is now {}", adjustment.product.name, adjustment.change.new_stock));
    Ok(Reply::with_toast(adjustment, toast))
}

async fn create_product(State(s): State<AppState>, Client(c): Client, Json(form): Json<ProductForm>) -> Result<(StatusCode, Json<Reply<Product>>)> {
    let product = inventory::save_product(&s, &c, None, form).await?;
    Ok((StatusCode::CREATED, Reply::with_toast(product, Toast::success("Product created"))))
}

async fn update_product(State(s): State<AppState>, Client(c): Client, Path(id): Path<String>, Json(form): Json<ProductForm>) -> Result<Json<Reply<Product>>> {
    let product = inventory::save_product(&s, &c, Some(&id), form).await?;
    Ok(Reply::with_toast(product, Toast::success("Product updated")))
}

// -------------------------------------------------------------------- orders

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderParams {
    pub search: String,
    /// A status name, or `all`.
    pub status: Option<String>,
    pub date_range: DateRange,
    pub sort: OrderSort,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

async fn list_orders(State(s): State<AppState>, Client(c): Client, Query(p): Query<OrderParams>) -> Result<Json<Reply<OrderDesk>>> {
    let status = selection(p.status.as_deref()).map(str::parse::<OrderStatus>).transpose()?;
    let filter = OrderFilter { search: p.search, status, date_range: p.date_range, sort: p.sort };
    Ok(Reply::new(orders::admin_orders(&s, &c, &filter, page(p.page, p.per_page)).await?))
}

fn notify_by_default() -> bool { true }

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
    #[serde(default = "notify_by_default")]
    pub notify: bool,
}

async fn update_order_status(State(s): State<AppState>, Client(c): Client, Path(id): Path<String>, Json(b): Json<StatusBody>) -> Result<Json<Reply<StatusChange>>> {
    let status: OrderStatus = b.status.parse()?;
    let change = orders::update_status(&s, &c, &id, status, b.notify).await?;
    let toast = if b.notify && !change.email_sent {
        Toast::info(format!("Order {} marked {}, customer email not sent", change.order.number(), status))
    } else {
        Toast::success(format!("Order {} marked {}", change.order.number(), status))
    };
    Ok(Reply::with_toast(change, toast))
}
