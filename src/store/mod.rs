//! Typed key-value store for per-client state.
//!
//! Each client (browser profile or device, identified by [`ClientId`]) owns a
//! namespace of JSON entries under the keys the storefront has always used:
//! `user`, `token`, `cart`, `favorites_<userId>`, `profile_<userId>`,
//! `stockHistory` and `user_orders_<userId>`. Writes are last-write-wins.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::aggregates::{AddressBook, Cart, Favorites, Order, Session, StockHistory, User};
use crate::domain::value_objects::ClientId;

/// Owner used for favorites collected before sign-in.
pub const GUEST: &str = "guest";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKey<'a> {
    User,
    Token,
    Cart,
    Favorites(&'a str),
    Profile(&'a str),
    StockHistory,
    UserOrders(&'a str),
}

impl StateKey<'_> {
    pub fn name(&self) -> String {
        match self {
            Self::User => "user".to_string(),
            Self::Token => "token".to_string(),
            Self::Cart => "cart".to_string(),
            Self::Favorites(id) => format!("favorites_{id}"),
            Self::Profile(id) => format!("profile_{id}"),
            Self::StockHistory => "stockHistory".to_string(),
            Self::UserOrders(id) => format!("user_orders_{id}"),
        }
    }
}

/// Storage backend for raw JSON entries.
#[derive(Clone)]
pub enum StateStore {
    Memory(MemoryStore),
    Postgres(PgStore),
}

impl StateStore {
    pub fn memory() -> Self { Self::Memory(MemoryStore::default()) }

    pub fn backend(&self) -> &'static str {
        match self { Self::Memory(_) => "memory", Self::Postgres(_) => "postgres" }
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        match self { Self::Memory(s) => Ok(s.get(key).await), Self::Postgres(s) => s.get(key).await }
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        match self { Self::Memory(s) => { s.set(key, value).await; Ok(()) } Self::Postgres(s) => s.set(key, value).await }
    }

    pub async fn remove(&self, key: &str) -> Result<(), StateError> {
        match self { Self::Memory(s) => { s.remove(key).await; Ok(()) } Self::Postgres(s) => s.remove(key).await }
    }

    pub fn client(&self, client: ClientId) -> ClientState {
        ClientState { store: self.clone(), client }
    }
}

/// One client's view of the store, with typed accessors.
#[derive(Clone)]
pub struct ClientState {
    store: StateStore,
    client: ClientId,
}

impl ClientState {
    pub fn client_id(&self) -> &ClientId { &self.client }

    fn key(&self, key: StateKey<'_>) -> String { format!("{}:{}", self.client, key.name()) }

    /// Reads an entry; a missing or unreadable entry yields `T::default()`.
    pub async fn load<T: DeserializeOwned + Default>(&self, key: StateKey<'_>) -> Result<T, StateError> {
        Ok(self.load_opt(key).await?.unwrap_or_default())
    }

    async fn load_opt<T: DeserializeOwned>(&self, key: StateKey<'_>) -> Result<Option<T>, StateError> {
        let full = self.key(key);
        let Some(value) = self.store.get(&full).await? else { return Ok(None) };
        match serde_json::from_value(value) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(key = %full, error = %e, "discarding unreadable client state");
                Ok(None)
            }
        }
    }

    pub async fn save<T: Serialize>(&self, key: StateKey<'_>, value: &T) -> Result<(), StateError> {
        self.store.set(&self.key(key), serde_json::to_value(value)?).await
    }

    pub async fn remove(&self, key: StateKey<'_>) -> Result<(), StateError> {
        self.store.remove(&self.key(key)).await
    }

    pub async fn session(&self) -> Result<Option<Session>, StateError> {
        let user: Option<User> = self.load_opt(StateKey::User).await?;
        let token: Option<String> = self.load_opt(StateKey::Token).await?;
        Ok(user.zip(token).filter(|(_, t)| !t.is_empty()).map(|(user, token)| Session { user, token }))
    }

    pub async fn save_session(&self, session: &Session) -> Result<(), StateError> {
        self.save(StateKey::User, &session.user).await?;
        self.save(StateKey::Token, &session.token).await
    }

    /// Sign-out: drops `user` and `token`, nothing else.
    pub async fn clear_auth(&self) -> Result<(), StateError> {
        self.remove(StateKey::User).await?;
        self.remove(StateKey::Token).await
    }

    pub async fn cart(&self) -> Result<Cart, StateError> { self.load(StateKey::Cart).await }
    pub async fn save_cart(&self, cart: &Cart) -> Result<(), StateError> { self.save(StateKey::Cart, cart).await }

    pub async fn favorites(&self, owner: &str) -> Result<Favorites, StateError> { self.load(StateKey::Favorites(owner)).await }
    pub async fn save_favorites(&self, owner: &str, favorites: &Favorites) -> Result<(), StateError> {
        self.save(StateKey::Favorites(owner), favorites).await
    }

    pub async fn address_book(&self, user_id: &str) -> Result<AddressBook, StateError> { self.load(StateKey::Profile(user_id)).await }
    pub async fn save_address_book(&self, user_id: &str, book: &AddressBook) -> Result<(), StateError> {
        self.save(StateKey::Profile(user_id), book).await
    }

    pub async fn stock_history(&self) -> Result<StockHistory, StateError> { self.load(StateKey::StockHistory).await }
    pub async fn save_stock_history(&self, history: &StockHistory) -> Result<(), StateError> {
        self.save(StateKey::StockHistory, history).await
    }

    pub async fn user_orders(&self, user_id: &str) -> Result<Vec<Order>, StateError> { self.load(StateKey::UserOrders(user_id)).await }
    pub async fn save_user_orders(&self, user_id: &str, orders: &[Order]) -> Result<(), StateError> {
        self.save(StateKey::UserOrders(user_id), &orders).await
    }
}
