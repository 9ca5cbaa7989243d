//! HTTP client for the upstream catalog / order / auth REST API.
//!
//! Responses come either wrapped (`{ "success": true, "data": ... }`) or bare;
//! [`BackendClient`] accepts both. A `"success": false` body becomes
//! [`ApiError::Rejected`], and HTTP 401 is always [`ApiError::Unauthorized`].

mod error;
pub mod types;

pub use error::ApiError;
pub use types::{DashboardStats, LoginRequest, Pagination, ProductPage, RegisterRequest};

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::domain::aggregates::{NewOrder, Order, OrderStatus, Product, ProductForm, Session, User};
use crate::notify::email::{Audience, EmailMessage};
use crate::views::catalog::CatalogQuery;
use types::{BatchRequest, StatusUpdate, StockPatch};

/// Product detail requests give up sooner than the client-wide timeout.
pub const PRODUCT_DETAIL_TIMEOUT: Duration = Duration::from_secs(8);
/// Page size used when the back office loads the whole catalog.
pub const FULL_CATALOG_LIMIT: u32 = 1000;

/// Client for the upstream API. Cheap to clone; [`BackendClient::with_token`]
/// derives a per-user client that sends `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    detail_timeout: Duration,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("optica-store/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() { return Err(ApiError::InvalidUrl(normalised)); }
        Ok(Self { client, base_url, token: None, detail_timeout: PRODUCT_DETAIL_TIMEOUT })
    }

    pub fn with_token(&self, token: &str) -> Self {
        Self { token: Some(token.to_string()), ..self.clone() }
    }

    /// Overrides [`PRODUCT_DETAIL_TIMEOUT`].
    pub fn with_detail_timeout(self, detail_timeout: Duration) -> Self { Self { detail_timeout, ..self } }

    pub fn base_url(&self) -> &Url { &self.base_url }
    pub fn detail_timeout(&self) -> Duration { self.detail_timeout }

    // ---------------------------------------------------------------- products

    pub async fn list_products(&self, query: &CatalogQuery) -> Result<ProductPage, ApiError> {
        let req = self.request(Method::GET, &["api", "products"])?.query(query);
        let body = self.send(req, "GET /api/products").await?;
        decode(body, "GET /api/products")
    }

    /// Every product, for the back-office views.
    pub async fn all_products(&self) -> Result<Vec<Product>, ApiError> {
        let query = CatalogQuery { limit: Some(FULL_CATALOG_LIMIT), ..CatalogQuery::default() };
        Ok(self.list_products(&query).await?.data)
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        let req = self.request(Method::GET, &["api", "products", id])?.timeout(self.detail_timeout);
        let body = self.send(req, "GET /api/products/:id").await?;
        decode(payload(body, &["data", "product"]), "GET /api/products/:id")
    }

    pub async fn products_batch(&self, ids: &[String]) -> Result<Vec<Product>, ApiError> {
        let req = self.request(Method::POST, &["api", "products", "batch"])?.json(&BatchRequest { ids });
        let body = self.send(req, "POST /api/products/batch").await?;
        decode(payload(body, &["data", "products"]), "POST /api/products/batch")
    }

    pub async fn create_product(&self, form: &ProductForm) -> Result<Product, ApiError> {
        let req = self.request(Method::POST, &["api", "products"])?.json(form);
        let body = self.send(req, "POST /api/products").await?;
        decode(payload(body, &["data", "product"]), "POST /api/products")
    }

    pub async fn update_product(&self, id: &str, form: &ProductForm) -> Result<Product, ApiError> {
        let req = self.request(Method::PUT, &["api", "products", id])?.json(form);
        let body = self.send(req, "PUT /api/products/:id").await?;
        decode(payload(body, &["data", "product"]), "PUT /api/products/:id")
    }

    /// `PATCH /api/products/:id` with the new absolute stock.
    pub async fn update_stock(&self, id: &str, stock: u32) -> Result<(), ApiError> {
        let req = self.request(Method::PATCH, &["api", "products", id])?.json(&StockPatch { stock });
        self.send(req, "PATCH /api/products/:id").await?;
        Ok(())
    }

    // ------------------------------------------------------------------ orders

    pub async fn list_orders(&self, user_id: Option<&str>) -> Result<Vec<Order>, ApiError> {
        let mut req = self.request(Method::GET, &["api", "orders"])?;
        if let Some(user_id) = user_id { req = req.query(&[("userId", user_id)]); }
        let body = self.send(req, "GET /api/orders").await?;
        decode_each(payload(body, &["data", "orders"]), "GET /api/orders")
    }

    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let req = self.request(Method::POST, &["api", "orders"])?.json(order);
        let body = self.send(req, "POST /api/orders").await?;
        let created: Order = decode(payload(body, &["data", "order"]), "POST /api/orders")?;
        if created.number().is_empty() {
            return Err(ApiError::Rejected("order created without an id".to_string()));
        }
        Ok(created)
    }

    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<(), ApiError> {
        let req = self.request(Method::PUT, &["api", "orders"])?.json(&StatusUpdate { order_id, status });
        self.send(req, "PUT /api/orders").await?;
        Ok(())
    }

    // -------------------------------------------------------------------- auth

    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, ApiError> {
        let req = self.request(Method::POST, &["api", "auth", "register"])?.json(request);
        let body = self.send(req, "POST /api/auth/register").await?;
        decode(payload(body, &["data"]), "POST /api/auth/register")
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        let req = self.request(Method::POST, &["api", "auth", "login"])?.json(request);
        let body = self.send(req, "POST /api/auth/login").await?;
        decode(payload(body, &["data"]), "POST /api/auth/login")
    }

    /// Checks this client's bearer token and returns its user.
    pub async fn validate(&self) -> Result<User, ApiError> {
        let req = self.request(Method::GET, &["api", "auth", "validate"])?;
        let body = self.send(req, "GET /api/auth/validate").await?;
        decode(payload(body, &["data", "user"]), "GET /api/auth/validate")
    }

    // ------------------------------------------------------------- admin/email

    pub async fn admin_stats(&self) -> Result<DashboardStats, ApiError> {
        let req = self.request(Method::GET, &["api", "admin", "stats"])?;
        let body = self.send(req, "GET /api/admin/stats").await?;
        decode(payload(body, &["data", "stats"]), "GET /api/admin/stats")
    }

    pub async fn send_email(&self, audience: Audience, message: &EmailMessage) -> Result<(), ApiError> {
        let path: &[&str] = match audience {
            Audience::Admin => &["api", "admin", "send-email"],
            Audience::Customer => &["api", "send-email"],
        };
        let req = self.request(Method::POST, path)?.json(message);
        self.send(req, "send-email").await?;
        Ok(())
    }

    // ---------------------------------------------------------------- plumbing

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        let req = self.client.request(method, url);
        Ok(match &self.token { Some(token) => req.bearer_auth(token), None => req })
    }

    /// Sends the request and returns the JSON body (`null` for an empty body).
    async fn send(&self, req: RequestBuilder, context: &str) -> Result<Value, ApiError> {
        let response = req.send().await.map_err(|e| classify(e, context))?;
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::debug!(context, "upstream rejected credentials");
            return Err(ApiError::Unauthorized);
        }
        let text = response.text().await.map_err(|e| classify(e, context))?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else if status.is_success() {
            serde_json::from_str(&text).map_err(|source| ApiError::Decode { context: context.to_string(), source })?
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        if !status.is_success() {
            let message = message_of(&body).unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            tracing::warn!(context, status = status.as_u16(), %message, "upstream request failed");
            return Err(ApiError::Status { status: status.as_u16(), message });
        }
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            return Err(ApiError::Rejected(message_of(&body).unwrap_or_else(|| "request was not successful".to_string())));
        }
        Ok(body)
    }
}

fn classify(err: reqwest::Error, context: &str) -> ApiError {
    if err.is_timeout() { ApiError::Timeout(context.to_string()) } else { ApiError::Http(err) }
}

fn message_of(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => ["message", "error"].iter().find_map(|k| map.get(*k).and_then(Value::as_str)).map(str::to_string),
        _ => None,
    }
}

/// Unwraps the first present envelope key, or returns the body unchanged.
fn payload(body: Value, keys: &[&str]) -> Value {
    if let Value::Object(mut map) = body {
        for key in keys {
            if let Some(inner) = map.remove(*key) { return inner; }
        }
        Value::Object(map)
    } else {
        body
    }
}

fn decode<T: DeserializeOwned>(value: Value, context: &str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|source| ApiError::Decode { context: context.to_string(), source })
}

/// Decodes a list record by record, skipping (and logging) records that do not decode.
fn decode_each<T: DeserializeOwned>(value: Value, context: &str) -> Result<Vec<T>, ApiError> {
    let records: Vec<Value> = decode(value, context)?;
    Ok(records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(context, index, error = %e, "skipping malformed record");
                None
            }
        })
        .collect())
}
