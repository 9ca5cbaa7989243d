//! Cart and favorites for the current client.

use serde::Serialize;

use crate::domain::aggregates::{Cart, CartItem, CartTotals, Favorites, LineKey};
use crate::store::ClientState;
use crate::Result;

use super::session::favorites_owner;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub totals: CartTotals,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let totals = cart.totals();
        let item_count = cart.item_count();
        Self { items: cart.into_items(), item_count, totals }
    }
}

pub async fn view(client: &ClientState) -> Result<CartView> {
    Ok(client.cart().await?.into())
}

pub async fn add_item(client: &ClientState, item: CartItem) -> Result<CartView> {
    let mut cart = client.cart().await?;
    cart.add_item(item)?;
    client.save_cart(&cart).await?;
    Ok(cart.into())
}

pub async fn set_quantity(client: &ClientState, key: &LineKey, quantity: u32) -> Result<CartView> {
    let mut cart = client.cart().await?;
    cart.set_quantity(key, quantity)?;
    client.save_cart(&cart).await?;
    Ok(cart.into())
}

/// Folds a cart held elsewhere (another tab, a guest session) into the stored one.
pub async fn merge(client: &ClientState, other: Cart) -> Result<CartView> {
    let mut cart = client.cart().await?;
    cart.merge(other);
    client.save_cart(&cart).await?;
    Ok(cart.into())
}

pub async fn clear(client: &ClientState) -> Result<CartView> {
    let cart = Cart::new();
    client.save_cart(&cart).await?;
    Ok(cart.into())
}

pub async fn favorites(client: &ClientState) -> Result<Favorites> {
    let owner = favorites_owner(client).await?;
    Ok(client.favorites(&owner).await?)
}

/// Returns whether the product is a favorite after the toggle.
pub async fn toggle_favorite(client: &ClientState, product_id: &str) -> Result<(bool, Favorites)> {
    let owner = favorites_owner(client).await?;
    let mut favorites = client.favorites(&owner).await?;
    let now_favorite = favorites.toggle(product_id);
    client.save_favorites(&owner, &favorites).await?;
    Ok((now_favorite, favorites))
}
