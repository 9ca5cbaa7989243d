//! In-process backend, used in tests and when no database is configured.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub async fn get(&self, key: &str) -> Option<Value> { self.entries.read().await.get(key).cloned() }
    pub async fn set(&self, key: &str, value: Value) { self.entries.write().await.insert(key.to_string(), value); }
    pub async fn remove(&self, key: &str) { self.entries.write().await.remove(key); }
}
