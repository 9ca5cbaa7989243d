//! Optica storefront & back-office service
//!
//! Backend-for-frontend for an eyewear shop. The catalog, orders and accounts
//! live behind an upstream REST API; this service owns the logic around them.
//!
//! ## Features
//! - Catalog browsing with upstream filters and local refinements
//! - Cart, favorites and saved addresses per client
//! - Checkout with a locally synthesized order when the order service fails
//! - Admin inventory and order views, stock adjustment with a capped history
//! - Order status emails and periodic dashboard refresh

pub mod api;
pub mod config;
pub mod domain;
pub mod notify;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod views;

use thiserror::Error;

use crate::api::ApiError;
use crate::domain::aggregates::{AddressBookError, CartError, OrderError};
use crate::domain::form::FieldErrors;
use crate::store::StateError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Upstream error: {0}")]
    Api(#[from] ApiError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Invalid {form}: {errors}")]
    Invalid { form: &'static str, errors: FieldErrors },

    #[error("Please sign in to continue")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Admin access required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),
}

impl From<AddressBookError> for StoreError {
    fn from(err: AddressBookError) -> Self {
        match err {
            AddressBookError::Invalid(errors) => Self::Invalid { form: "address", errors },
            AddressBookError::NotFound(id) => Self::NotFound(format!("Address {id}")),
        }
    }
}

impl From<CartError> for StoreError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ItemNotFound => Self::NotFound("Cart item".to_string()),
            CartError::InvalidQuantity => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<OrderError> for StoreError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::UnknownStatus(_) => Self::BadRequest(err.to_string()),
            OrderError::Unchanged(_) | OrderError::Terminal(_) => Self::Conflict(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
