//! marksync server - token-scoped bookmark sync over HTTP and WebSocket.

use marksync_engine::SyncService;
use marksync_server::config::Config;
use marksync_server::{create_app, store, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marksync_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting marksync server on {}:{}", config.host, config.port);

    let store = store::open_store(&config)?;
    tracing::info!(
        backend = store.kind(),
        path = %config.data_path.display(),
        recovery = ?config.recovery,
        "Opened bookmark store"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(SyncService::new(store), config);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
