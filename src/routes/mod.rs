//! HTTP surface. Every route reads the caller's namespace from `X-Client-Id`.

mod admin;
mod storefront;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::ApiError;
use crate::domain::value_objects::ClientId;
use crate::notify::Toast;
use crate::state::AppState;
use crate::store::ClientState;
use crate::StoreError;

pub const CLIENT_ID_HEADER: &str = "x-client-id";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(storefront::routes())
        .merge(admin::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(s): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({"status": "healthy", "service": "optica-store", "store": s.store.backend(), "events": s.events.is_enabled()}))
}

/// The calling client's slice of the key-value store.
pub struct Client(pub ClientState);

#[axum::async_trait]
impl FromRequestParts<AppState> for Client {
    type Rejection = StoreError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| StoreError::BadRequest("Missing X-Client-Id header".to_string()))?;
        let id = ClientId::new(raw).map_err(|e| StoreError::BadRequest(format!("Invalid X-Client-Id header: {e}")))?;
        Ok(Self(state.store.client(id)))
    }
}

/// Response envelope: the payload plus an optional toast for the UI.
#[derive(Debug, Serialize)]
pub struct Reply<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
}

impl<T: Serialize> Reply<T> {
    pub fn new(data: T) -> Json<Self> { Json(Self { data, toast: None }) }
    pub fn with_toast(data: T, toast: Toast) -> Json<Self> { Json(Self { data, toast: Some(toast) }) }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Invalid { .. } | Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::Unauthorized | Self::Api(ApiError::Unauthorized) => (StatusCode::UNAUTHORIZED, StoreError::Unauthorized.to_string()),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            // upstream validation messages are meant for the user
            Self::Api(ApiError::Status { status: 400..=499, message }) | Self::Api(ApiError::Rejected(message)) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            Self::Api(_) => (StatusCode::BAD_GATEWAY, "The store service is unavailable, please try again".to_string()),
            Self::State(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong, please try again".to_string()),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        }

        let message = match &self {
            Self::Invalid { errors, .. } => errors.iter().next().map_or(message, |e| e.message.clone()),
            _ => message,
        };
        let mut body = json!({ "error": message, "toast": Toast::error(message.clone()) });
        if let Self::Invalid { errors, .. } = &self {
            body["fields"] = json!(errors.to_map());
            body["focus"] = json!(errors.first_field());
        }
        (status, Json(body)).into_response()
    }
}
