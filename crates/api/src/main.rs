use anyhow::{Context, Result};
use domain::services::DeviceStore;
use persistence::repositories::DeviceRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use vlan_portal_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = config::Config::load().context("Failed to load configuration")?;

    middleware::logging::init_logging(&config.logging)
        .context("Failed to initialize logging")?;
    middleware::init_metrics().context("Failed to initialize metrics")?;

    info!("Starting VLAN Portal v{}", env!("CARGO_PKG_VERSION"));
    if config.auth.is_development() {
        warn!("Development mode enabled: requests without proxy headers use a simulated privileged user");
    }

    let pool = persistence::db::create_pool(&config.database.pool_config())
        .await
        .context("Failed to connect to database")?;

    if config.database.run_migrations {
        info!("Running database migrations...");
        persistence::db::run_migrations(&pool).await?;
        info!("Migrations completed");
    }

    let store: Arc<dyn DeviceStore> = Arc::new(DeviceRepository::new(pool));
    let addr = config.socket_addr().context("Invalid server address")?;
    let app = app::create_app(config, store);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
