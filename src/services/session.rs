//! Sign-up, sign-in, token validation and sign-out.

use crate::api::{ApiError, BackendClient, LoginRequest, RegisterRequest};
use crate::domain::aggregates::Session;
use crate::store::{ClientState, StateKey, GUEST};
use crate::{Result, StoreError};

use super::upstream;

/// The client's stored session, or `Unauthorized`.
pub async fn current(client: &ClientState) -> Result<Session> {
    client.session().await?.ok_or(StoreError::Unauthorized)
}

pub async fn require_admin(client: &ClientState) -> Result<Session> {
    let session = current(client).await?;
    if !session.user.is_admin() { return Err(StoreError::Forbidden); }
    Ok(session)
}

/// The key favorites are stored under: the user id when signed in, else [`GUEST`].
pub async fn favorites_owner(client: &ClientState) -> Result<String> {
    Ok(client.session().await?.map_or_else(|| GUEST.to_string(), |s| s.user.id))
}

pub async fn register(api: &BackendClient, client: &ClientState, request: &RegisterRequest) -> Result<Session> {
    sign_in(client, credentials(api.register(request).await)?).await
}

pub async fn login(api: &BackendClient, client: &ClientState, request: &LoginRequest) -> Result<Session> {
    sign_in(client, credentials(api.login(request).await)?).await
}

/// A 401 from the auth endpoints means bad credentials; the stored session is left as it is.
fn credentials(result: std::result::Result<Session, ApiError>) -> Result<Session> {
    match result {
        Err(ApiError::Unauthorized) => Err(StoreError::InvalidCredentials),
        other => Ok(other?),
    }
}

/// Re-checks the stored token upstream and refreshes the stored user.
pub async fn validate(api: &BackendClient, client: &ClientState) -> Result<Session> {
    let session = current(client).await?;
    let user = upstream(client, api.with_token(&session.token).validate().await).await?;
    let session = Session { user, token: session.token };
    client.save_session(&session).await?;
    Ok(session)
}

pub async fn logout(client: &ClientState) -> Result<()> {
    client.clear_auth().await?;
    tracing::info!(client = %client.client_id(), "signed out");
    Ok(())
}

/// Stores the session and folds guest favorites into the user's.
async fn sign_in(client: &ClientState, session: Session) -> Result<Session> {
    if session.token.is_empty() || session.user.id.is_empty() {
        return Err(StoreError::BadRequest("Sign-in response did not include a user and token".to_string()));
    }
    client.save_session(&session).await?;

    let guest = client.favorites(GUEST).await?;
    if !guest.is_empty() {
        let mut favorites = client.favorites(&session.user.id).await?;
        favorites.merge(guest);
        client.save_favorites(&session.user.id, &favorites).await?;
        client.remove(StateKey::Favorites(GUEST)).await?;
    }
    tracing::info!(client = %client.client_id(), user_id = %session.user.id, "signed in");
    Ok(session)
}
