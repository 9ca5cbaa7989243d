//! Request-level operations that combine the upstream API, client state and
//! the domain aggregates.

pub mod addresses;
pub mod cart;
pub mod checkout;
pub mod dashboard;
pub mod inventory;
pub mod orders;
pub mod session;

use crate::api::ApiError;
use crate::store::ClientState;
use crate::StoreError;

/// Converts an upstream result; a 401 signs the client out first.
pub(crate) async fn upstream<T>(client: &ClientState, result: Result<T, ApiError>) -> crate::Result<T> {
    match result {
        Err(ApiError::Unauthorized) => {
            tracing::info!(client = %client.client_id(), "upstream rejected token, clearing session");
            client.clear_auth().await?;
            Err(StoreError::Unauthorized)
        }
        other => Ok(other?),
    }
}
