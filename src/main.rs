use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use collab_api_rust::{app, config::config, database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("collab_api_rust=info,tower_http=info")),
        )
        .init();

    let config = config();
    info!("Starting Collaborate API in {} mode", config.environment.as_str());

    if config.security.jwt_secret.is_empty() {
        warn!("JWT_SECRET is not set; token issuance will fail");
    }

    if config.database.run_migrations {
        match database::DatabaseManager::pool().await {
            Ok(pool) => database::schema::migrate(&pool).await.context("failed to apply schema")?,
            Err(e) => warn!("Database unavailable, skipping migrations: {}", e),
        }
    }

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Collaborate API listening on http://{}", bind_addr);

    axum::serve(listener, app().into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database::DatabaseManager::close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
