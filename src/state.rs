//! Shared application state handed to every request handler.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::api::BackendClient;
use crate::config::Config;
use crate::domain::aggregates::Product;
use crate::domain::events::EventPublisher;
use crate::services::dashboard::DashboardSnapshot;
use crate::store::StateStore;

#[derive(Clone, Debug)]
pub struct ProductSnapshot {
    pub products: Vec<Product>,
    pub fetched_at: DateTime<Utc>,
}

/// Whether something stamped at `at` is younger than `max_age`. A stamp in the future counts as fresh.
pub(crate) fn is_fresh(at: DateTime<Utc>, max_age: Duration) -> bool {
    (Utc::now() - at).to_std().map_or(true, |age| age < max_age)
}

/// Last fetched collections, refreshed by the pollers and patched in place by mutations.
#[derive(Clone, Default)]
pub struct Snapshots {
    pub dashboard: Arc<RwLock<Option<DashboardSnapshot>>>,
    pub products: Arc<RwLock<Option<ProductSnapshot>>>,
}

impl Snapshots {
    /// The cached products, unless they were fetched longer than `max_age` ago.
    pub async fn fresh_products(&self, max_age: Duration) -> Option<Vec<Product>> {
        self.products.read().await.as_ref().filter(|s| is_fresh(s.fetched_at, max_age)).map(|s| s.products.clone())
    }

    pub async fn store_products(&self, products: Vec<Product>) {
        *self.products.write().await = Some(ProductSnapshot { products, fetched_at: Utc::now() });
    }

    /// Applies `f` to the cached product, if the snapshot holds it.
    pub async fn patch_product(&self, id: &str, f: impl FnOnce(&mut Product)) {
        if let Some(snapshot) = self.products.write().await.as_mut() {
            if let Some(product) = snapshot.products.iter_mut().find(|p| p.id == id) { f(product); }
        }
    }

    /// Replaces the cached product or appends it.
    pub async fn upsert_product(&self, product: Product) {
        if let Some(snapshot) = self.products.write().await.as_mut() {
            match snapshot.products.iter_mut().find(|p| p.id == product.id) {
                Some(slot) => *slot = product,
                None => snapshot.products.push(product),
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: BackendClient,
    pub store: StateStore,
    pub events: EventPublisher,
    pub snapshots: Snapshots,
}

impl AppState {
    pub fn new(config: Config, api: BackendClient, store: StateStore, events: EventPublisher) -> Self {
        Self { config: Arc::new(config), api, store, events, snapshots: Snapshots::default() }
    }
}
