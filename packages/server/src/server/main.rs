// Main entry point for API server

use anyhow::{Context, Result};
use playbook_server::{kernel::init_tracing, kernel::ServerDeps, server::build_app, Config};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    tracing::info!("Starting Playbook Extractor API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        extraction_model = %config.extraction_model,
        embedding_model = %config.embedding_model,
        "Configuration loaded"
    );

    // Connects, migrates and builds the model client
    tracing::info!("Connecting to database...");
    let deps = ServerDeps::from_config(&config).await?;
    tracing::info!("Database connected, migrations complete");

    let postgres = deps.postgres.clone();
    let app = build_app(deps);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(postgres) = postgres {
        postgres.pool().close().await;
        tracing::info!("Database pool closed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
