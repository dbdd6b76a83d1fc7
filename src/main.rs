use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lead_intake_api::config::Config;
use lead_intake_api::handlers::AppState;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, creates the lead store and
/// serves the API until Ctrl+C. Leads live only as long as this process.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_intake_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let addr = SocketAddr::new(config.host, config.port);

    // The store is owned by the state and dropped at shutdown.
    let app_state = Arc::new(AppState::new(config));
    tracing::info!(
        "Lead store initialized (blank policy: {:?})",
        app_state.validator.blank_policy()
    );

    let app = lead_intake_api::router(app_state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match app_state.store.count() {
        Ok(total) => tracing::info!("Server stopped, discarding {} lead(s)", total),
        Err(e) => tracing::error!("Server stopped, lead store unreadable: {}", e),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving.
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
