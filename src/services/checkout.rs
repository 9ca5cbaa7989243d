//! Checkout: turns the stored cart into an order.
//!
//! When the order service fails (anything but a 401) the order is built
//! locally instead and the customer still gets a confirmation. The failure is
//! only visible in the logs and in [`OrderSource::Fallback`].

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, BackendClient};
use crate::domain::aggregates::order::DEFAULT_PAYMENT_METHOD;
use crate::domain::aggregates::{Address, NewOrder, Order};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::form::FieldErrors;
use crate::notify::email::{order_confirmation_email, Audience};
use crate::state::AppState;
use crate::store::ClientState;
use crate::{Result, StoreError};

use super::session::current;
use super::upstream;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutRequest {
    /// A saved address; the default address is used when neither this nor `address` is set.
    pub address_id: Option<String>,
    /// A one-off address that is not saved.
    pub address: Option<Address>,
    pub payment_method: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSource {
    Remote,
    Fallback,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub order: Order,
    pub source: OrderSource,
    pub email_sent: bool,
}

async fn shipping_address(client: &ClientState, user_id: &str, request: &CheckoutRequest) -> Result<Address> {
    let address = match (&request.address, &request.address_id) {
        (Some(address), _) => address.clone().normalized(),
        (None, Some(id)) => {
            let book = client.address_book(user_id).await?;
            book.get(id).cloned().ok_or_else(|| StoreError::NotFound(format!("Address {id}")))?
        }
        (None, None) => {
            let book = client.address_book(user_id).await?;
            book.default_address().cloned().ok_or_else(|| StoreError::Invalid {
                form: "address",
                errors: FieldErrors::single("address", "Add a shipping address to continue"),
            })?
        }
    };
    address.check().map_err(|errors| StoreError::Invalid { form: "address", errors })?;
    Ok(address)
}

pub async fn place_order(app: &AppState, client: &ClientState, request: CheckoutRequest) -> Result<CheckoutOutcome> {
    let session = current(client).await?;
    let mut cart = client.cart().await?;
    if cart.is_empty() { return Err(StoreError::BadRequest("Your cart is empty".to_string())); }

    let address = shipping_address(client, &session.user.id, &request).await?;
    let payment_method = request.payment_method.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
    let totals = cart.totals();
    let mut draft = NewOrder::new(cart.items().to_vec(), totals, address, payment_method);
    draft.user_id = Some(session.user.id.clone());
    let fallback_email = draft.shipping_address.email.clone();
    draft.customer_email = Some(session.user.email.clone()).filter(|e| !e.is_empty()).or(fallback_email);

    let api = app.api.with_token(&session.token);
    let (order, source) = match api.create_order(&draft).await {
        Ok(order) => (order, OrderSource::Remote),
        Err(ApiError::Unauthorized) => return upstream(client, Err(ApiError::Unauthorized)).await,
        Err(e) => {
            tracing::warn!(error = %e, user_id = %session.user.id, "order service failed, recording order locally");
            (Order::local(draft, Utc::now()), OrderSource::Fallback)
        }
    };

    let mut orders = client.user_orders(&session.user.id).await?;
    orders.retain(|o| o.number() != order.number());
    orders.insert(0, order.clone());
    client.save_user_orders(&session.user.id, &orders).await?;
    cart.clear();
    client.save_cart(&cart).await?;

    let email_sent = send_confirmation(app, &api, &order).await;
    app.events
        .publish(DomainEvent::Order(OrderEvent::Placed { order_id: order.number().to_string(), total: order.total, local: source == OrderSource::Fallback }))
        .await;
    tracing::info!(order = %order.number(), total = %order.total, ?source, "order placed");

    Ok(CheckoutOutcome { order, source, email_sent })
}

/// Best effort; a failed email never fails the checkout.
async fn send_confirmation(app: &AppState, api: &BackendClient, order: &Order) -> bool {
    let message = match order_confirmation_email(&app.config.store_name, order) {
        Ok(Some(m)) => m,
        Ok(None) => return false,
        Err(e) => { tracing::warn!(error = %e, "failed to render confirmation email"); return false; }
    };
    match api.send_email(Audience::Customer, &message).await {
        Ok(()) => true,
        Err(e) => { tracing::warn!(error = %e, order = %order.number(), "failed to send confirmation email"); false }
    }
}
