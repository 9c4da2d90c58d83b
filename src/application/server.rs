use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::application::routes::app_router;
use crate::application::state::{AppState, AppStateConfig, StorageConfig};
use crate::infrastructure::database::Database;
use crate::infrastructure::openai::OpenAiConfig;

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub openai: OpenAiConfig,
    pub storage: StorageConfig,
    pub cors_origin: Option<String>,
    pub upstream_timeout: Duration,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    if config.openai.api_key.is_empty() {
        tracing::warn!("no OpenAI API key configured; upstream calls will be rejected");
    }

    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    if let StorageConfig::Filesystem { images_dir } = &config.storage {
        tokio::fs::create_dir_all(images_dir)
            .await
            .with_context(|| format!("failed to create {}", images_dir.display()))?;
        info!(images_dir = %images_dir.display(), "storing image bytes on disk");
    }

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            openai: config.openai,
            storage: config.storage,
            upstream_timeout: config.upstream_timeout,
            cors_origin: config.cors_origin,
        },
    )?;

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        database = %config.database_url,
        "starting HTTP server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    database.close().await;
    info!("server shutdown complete");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
