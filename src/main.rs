//! Optica storefront & back-office service

use anyhow::Result;
use optica_store::api::BackendClient;
use optica_store::config::Config;
use optica_store::domain::events::EventPublisher;
use optica_store::services::dashboard::{spawn_catalog_poller, spawn_dashboard_poller};
use optica_store::state::AppState;
use optica_store::store::{PgStore, StateStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let store = match &config.database_url {
        Some(url) => StateStore::Postgres(PgStore::connect(url, config.database_max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, client state is kept in memory and lost on restart");
            StateStore::memory()
        }
    };
    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => { tracing::warn!(error = %e, "NATS unavailable, domain events disabled"); None }
        },
        None => None,
    };
    let api = BackendClient::new(&config.api_base_url, config.api_timeout_secs)?;
    let addr = config.bind_addr();
    let (dashboard_poll, catalog_poll, service_token) = (config.dashboard_poll, config.catalog_poll, config.service_token.clone());
    let state = AppState::new(config, api.clone(), store, EventPublisher::new(nats));

    // pollers abort on drop; keep them until the server exits
    let _pollers = match service_token {
        Some(token) => {
            let admin = api.with_token(&token);
            vec![spawn_dashboard_poller(state.clone(), admin.clone(), dashboard_poll), spawn_catalog_poller(state.clone(), admin, catalog_poll)]
        }
        None => {
            tracing::info!("API_SERVICE_TOKEN not set, dashboard is fetched on demand");
            Vec::new()
        }
    };

    let app = optica_store::routes::router(state);
    tracing::info!("🚀 Optica store listening on {} (upstream {})", addr, api.base_url());
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
