use std::net::SocketAddr;
use anyhow::Context;
use skyroute_api::{app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyroute_api=debug,skyroute_order=debug,skyroute_store=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skyroute_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting SkyRoute API on port {}", config.server.port);

    let storage = skyroute_store::open_storage(&config.storage).context("Failed to open storage")?;
    let app_state = AppState::build(storage, config.business_rules.clone())
        .await
        .context("Failed to initialise wallet")?;

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
