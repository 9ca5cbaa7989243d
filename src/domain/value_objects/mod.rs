//! Value Objects for the storefront

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_CLIENT_ID_LEN: usize = 64;

/// Identifies one client (browser profile / device) whose state lives in the key-value store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(value: impl Into<String>) -> Result<Self, ClientIdError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(ClientIdError::Empty); }
        if value.len() > MAX_CLIENT_ID_LEN { return Err(ClientIdError::TooLong); }
        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') { return Err(ClientIdError::InvalidCharacter); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ClientIdError { Empty, TooLong, InvalidCharacter }
impl std::error::Error for ClientIdError {}
impl fmt::Display for ClientIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "client id empty"),
            Self::TooLong => write!(f, "client id too long"),
            Self::InvalidCharacter => write!(f, "client id may only contain letters, digits, '-' and '_'"),
        }
    }
}

/// Human-facing order number (`orderId` on the wire)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Number for an order synthesized locally: `ORD` followed by epoch millis.
    pub fn local(at: DateTime<Utc>) -> Self { Self(format!("ORD{}", at.timestamp_millis())) }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Units on hand for a product; never negative
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockLevel(u32);

impl StockLevel {
    pub fn new(value: u32) -> Self { Self(value) }
    pub fn value(&self) -> u32 { self.0 }
    /// Applies a signed delta, clamping at zero (and at `u32::MAX`).
    pub fn apply(&self, delta: i64) -> Self {
        let next = i64::from(self.0).saturating_add(delta).clamp(0, i64::from(u32::MAX));
        Self(u32::try_from(next).unwrap_or(u32::MAX))
    }
}
