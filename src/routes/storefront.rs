use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Client, Reply};
use crate::api::{LoginRequest, Pagination, RegisterRequest};
use crate::domain::aggregates::{Address, AddressBook, Cart, CartItem, Favorites, LineKey, Order, Product, Session};
use crate::notify::Toast;
use crate::services::cart::CartView;
use crate::services::checkout::{CheckoutOutcome, CheckoutRequest, OrderSource};
use crate::services::{addresses, cart, checkout, orders, session};
use crate::state::AppState;
use crate::views::catalog::{refine, CatalogFilter, CatalogQuery, CatalogSort};
use crate::{Result, StoreError};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/batch", post(products_batch))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/cart", get(get_cart).delete(clear_cart))
        .route("/api/v1/cart/items", post(add_to_cart).put(set_quantity))
        .route("/api/v1/cart/merge", post(merge_cart))
        .route("/api/v1/favorites", get(list_favorites))
        .route("/api/v1/favorites/:product_id", post(toggle_favorite))
        .route("/api/v1/addresses", get(list_addresses).post(save_address))
        .route("/api/v1/addresses/:id", delete(delete_address))
        .route("/api/v1/addresses/:id/default", post(set_default_address))
        .route("/api/v1/checkout", post(place_order))
        .route("/api/v1/orders", get(list_orders))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/session", get(current_session))
        .route("/api/v1/auth/logout", post(logout))
}

// ------------------------------------------------------------------- catalog

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogParams {
    pub limit: Option<u32>,
    pub page: Option<u32>,
    pub gender: Option<String>,
    pub brand: Option<String>,
    pub material: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock_only: bool,
    pub sort: CatalogSort,
}

impl CatalogParams {
    fn split(self) -> (CatalogQuery, CatalogFilter) {
        let query = CatalogQuery { limit: self.limit, gender: self.gender, brand: self.brand, material: self.material, size: self.size, color: self.color, page: self.page };
        let filter = CatalogFilter { min_price: self.min_price, max_price: self.max_price, in_stock_only: self.in_stock_only, sort: self.sort };
        (query.normalized(), filter)
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

async fn list_products(State(s): State<AppState>, Query(p): Query<CatalogParams>) -> Result<Json<Reply<CatalogPage>>> {
    let (query, filter) = p.split();
    let page = s.api.list_products(&query).await?;
    let products = refine(&page.data, &filter).into_iter().cloned().collect();
    Ok(Reply::new(CatalogPage { products, pagination: page.pagination }))
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Reply<Product>>> {
    match s.api.get_product(&id).await {
        Ok(product) => Ok(Reply::new(product)),
        Err(e) if e.is_not_found() => Err(StoreError::NotFound(format!("Product {id}"))),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub ids: Vec<String>,
}

async fn products_batch(State(s): State<AppState>, Json(b): Json<BatchBody>) -> Result<Json<Reply<Vec<Product>>>> {
    if b.ids.is_empty() { return Ok(Reply::new(Vec::new())); }
    Ok(Reply::new(s.api.products_batch(&b.ids).await?))
}

// ---------------------------------------------------------- cart & favorites

async fn get_cart(Client(c): Client) -> Result<Json<Reply<CartView>>> {
    Ok(Reply::new(cart::view(&c).await?))
}

async fn add_to_cart(Client(c): Client, Json(item): Json<CartItem>) -> Result<Json<Reply<CartView>>> {
    let toast = Toast::success(format!("{} added to cart", item.name));
    Ok(Reply::with_toast(cart::add_item(&c, item).await?, toast))
}

#[derive(Debug, Deserialize)]
pub struct QuantityBody {
    #[serde(rename = "_id")]
    pub product_id: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: u32,
}

async fn set_quantity(Client(c): Client, Json(b): Json<QuantityBody>) -> Result<Json<Reply<CartView>>> {
    let key = LineKey { product_id: b.product_id, color: b.color, size: b.size };
    Ok(Reply::new(cart::set_quantity(&c, &key, b.quantity).await?))
}

async fn merge_cart(Client(c): Client, Json(other): Json<Cart>) -> Result<Json<Reply<CartView>>> {
    Ok(Reply::new(cart::merge(&c, other).await?))
}

async fn clear_cart(Client(c): Client) -> Result<Json<Reply<CartView>>> {
    Ok(Reply::new(cart::clear(&c).await?))
}

async fn list_favorites(Client(c): Client) -> Result<Json<Reply<Favorites>>> {
    Ok(Reply::new(cart::favorites(&c).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggle {
    pub product_id: String,
    pub favorite: bool,
    pub favorites: Favorites,
}

async fn toggle_favorite(Client(c): Client, Path(product_id): Path<String>) -> Result<Json<Reply<FavoriteToggle>>> {
    let (favorite, favorites) = cart::toggle_favorite(&c, &product_id).await?;
    let toast = if favorite { Toast::success("Added to favorites") } else { Toast::info("Removed from favorites") };
    Ok(Reply::with_toast(FavoriteToggle { product_id, favorite, favorites }, toast))
}

// ----------------------------------------------------------------- addresses

async fn list_addresses(Client(c): Client) -> Result<Json<Reply<AddressBook>>> {
    Ok(Reply::new(addresses::list(&c).await?))
}

#[derive(Debug, Serialize)]
pub struct SavedAddress {
    pub address: Address,
    pub book: AddressBook,
}

async fn save_address(Client(c): Client, Json(address): Json<Address>) -> Result<(StatusCode, Json<Reply<SavedAddress>>)> {
    let created = address.id.is_empty();
    let (address, book) = addresses::save(&c, address).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Reply::with_toast(SavedAddress { address, book }, Toast::success("Address saved"))))
}

async fn delete_address(Client(c): Client, Path(id): Path<String>) -> Result<Json<Reply<AddressBook>>> {
    Ok(Reply::with_toast(addresses::delete(&c, &id).await?, Toast::success("Address removed")))
}

async fn set_default_address(Client(c): Client, Path(id): Path<String>) -> Result<Json<Reply<AddressBook>>> {
    Ok(Reply::new(addresses::set_default(&c, &id).await?))
}

// -------------------------------------------------------------------- orders

async fn place_order(State(s): State<AppState>, Client(c): Client, Json(r): Json<CheckoutRequest>) -> Result<(StatusCode, Json<Reply<CheckoutOutcome>>)> {
    let outcome = checkout::place_order(&s, &c, r).await?;
    let toast = match outcome.source {
        OrderSource::Remote => Toast::success(format!("Order {} placed", outcome.order.number())),
        OrderSource::Fallback => Toast::success(format!("Order {} received", outcome.order.number())),
    };
    Ok((StatusCode::CREATED, Reply::with_toast(outcome, toast)))
}

async fn list_orders(State(s): State<AppState>, Client(c): Client) -> Result<Json<Reply<Vec<Order>>>> {
    Ok(Reply::new(orders::customer_orders(&s, &c).await?))
}

// ---------------------------------------------------------------------- auth

async fn register(State(s): State<AppState>, Client(c): Client, Json(r): Json<RegisterRequest>) -> Result<(StatusCode, Json<Reply<Session>>)> {
    let session = session::register(&s.api, &c, &r).await?;
    let toast = Toast::success(format!("Welcome, {}", session.user.name));
    Ok((StatusCode::CREATED, Reply::with_toast(session, toast)))
}

async fn login(State(s): State<AppState>, Client(c): Client, Json(r): Json<LoginRequest>) -> Result<Json<Reply<Session>>> {
    let session = session::login(&s.api, &c, &r).await?;
    let toast = Toast::success(format!("Welcome back, {}", session.user.name));
    Ok(Reply::with_toast(session, toast))
}

async fn current_session(State(s): State<AppState>, Client(c): Client) -> Result<Json<Reply<Session>>> {
    Ok(Reply::new(session::validate(&s.api, &c).await?))
}

async fn logout(Client(c): Client) -> Result<Json<Reply<()>>> {
    session::logout(&c).await?;
    Ok(Reply::with_toast((), Toast::info("Signed out")))
}
