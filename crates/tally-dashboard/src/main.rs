mod actor;
mod config;
mod error;
mod routes;
mod views;


use std::net::SocketAddr;

use config::AppConfig;
use routes::{app_router, AppState};
use tally_core::api::VotingApiClient;
use tally_core::services::{Store, SyncService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Only load .env in development; deployments inject the environment directly.
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tally_dashboard=info".parse().expect("valid directive"))
                .add_directive("tally_core=info".parse().expect("valid directive")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting tally-dashboard with config: {:?}", config);

    let store = Store::open_path(&config.database_path).await?;
    let client = VotingApiClient::new(config.api.clone(), store.clone())?;
    let state = AppState::new(SyncService::new(client, store));
    let router = app_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        "tally-dashboard listening on {} (backend {})",
        config.bind_addr,
        config.api.base_url()
    );
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
