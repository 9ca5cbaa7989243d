//! Back-office inventory: the filtered product table, stock adjustments and
//! product create/update.

use serde::Serialize;

use crate::domain::aggregates::{Product, ProductForm, StockChange, StockHistory};
use crate::domain::events::{DomainEvent, ProductEvent};
use crate::state::AppState;
use crate::store::ClientState;
use crate::views::inventory::{categories, filter_products, summarize, InventoryFilter, InventorySummary};
use crate::views::{paginate, Page, PageRequest};
use crate::{Result, StoreError};

use super::session::require_admin;
use super::upstream;

/// The product snapshot, re-fetched with `token` when missing or older than
/// the catalog poll period.
pub(crate) async fn products(app: &AppState, client: &ClientState, token: &str) -> Result<Vec<Product>> {
    if let Some(products) = app.snapshots.fresh_products(app.config.catalog_poll).await {
        return Ok(products);
    }
    let products = upstream(client, app.api.with_token(token).all_products().await).await?;
    app.snapshots.store_products(products.clone()).await;
    Ok(products)
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    pub page: Page<Product>,
    pub summary: InventorySummary,
    pub categories: Vec<String>,
}

pub async fn inventory_view(app: &AppState, client: &ClientState, filter: &InventoryFilter, page: PageRequest) -> Result<InventoryView> {
    let session = require_admin(client).await?;
    let products = products(app, client, &session.token).await?;
    let view = filter_products(&products, filter);
    Ok(InventoryView {
        page: paginate(view, page).map(Product::clone),
        summary: summarize(&products),
        categories: categories(&products).into_iter().map(str::to_string).collect(),
    })
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub product: Product,
    pub change: StockChange,
}

/// Applies a signed delta to a product's stock, clamping at zero.
///
/// The cached snapshot is updated before the upstream write and is not rolled
/// back when the write fails; it is replaced once it is older than the catalog
/// poll period.
pub async fn adjust_stock(app: &AppState, client: &ClientState, product_id: &str, delta: i64, reason: Option<String>) -> Result<StockAdjustment> {
    if delta == 0 { return Err(StoreError::BadRequest("Adjustment must change the stock".to_string())); }
    let session = require_admin(client).await?;
    let api = app.api.with_token(&session.token);

    let cached = products(app, client, &session.token).await?.into_iter().find(|p| p.id == product_id);
    let mut product = match cached {
        Some(p) => p,
        None => match api.get_product(product_id).await {
            Err(e) if e.is_not_found() => return Err(StoreError::NotFound(format!("Product {product_id}"))),
            result => upstream(client, result).await?,
        },
    };

    let previous = product.stock;
    let next = product.stock_level().apply(delta).value();
    product.stock = next;
    app.snapshots.patch_product(product_id, |p| p.stock = next).await;

    upstream(client, api.update_stock(product_id, next).await).await?;

    let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    let change = StockChange::new(product_id, product.name.clone(), previous, next, delta, reason);
    let mut history = client.stock_history().await?;
    history.push(change.clone());
    client.save_stock_history(&history).await?;

    tracing::info!(product_id, previous, next, delta, "stock adjusted");
    app.events
        .publish(DomainEvent::Product(ProductEvent::StockAdjusted { product_id: product_id.to_string(), previous_stock: previous, new_stock: next, at: change.timestamp }))
        .await;

    Ok(StockAdjustment { product, change })
}

/// Recent adjustments made from this client, newest first, optionally for one product.
pub async fn stock_history(client: &ClientState, product_id: Option<&str>) -> Result<Vec<StockChange>> {
    require_admin(client).await?;
    let history: StockHistory = client.stock_history().await?;
    Ok(match product_id {
        Some(id) => history.for_product(id).cloned().collect(),
        None => history.iter().cloned().collect(),
    })
}

/// Creates the product when `product_id` is `None`, else updates it.
pub async fn save_product(app: &AppState, client: &ClientState, product_id: Option<&str>, form: ProductForm) -> Result<Product> {
    let session = require_admin(client).await?;
    let form = form.normalized();
    form.check().map_err(|errors| StoreError::Invalid { form: "product", errors })?;

    let api = app.api.with_token(&session.token);
    let product = match product_id {
        None => upstream(client, api.create_product(&form).await).await?,
        Some(id) => match api.update_product(id, &form).await {
            Err(e) if e.is_not_found() => return Err(StoreError::NotFound(format!("Product {id}"))),
            result => upstream(client, result).await?,
        },
    };

    app.snapshots.upsert_product(product.clone()).await;
    tracing::info!(product_id = %product.id, created = product_id.is_none(), "product saved");
    app.events.publish(DomainEvent::Product(ProductEvent::Saved { product_id: product.id.clone() })).await;
    Ok(product)
}
