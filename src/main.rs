//! Lexcache - declarative caching layer for the consultation marketplace backend
//!
//! Standalone entry point: starts the caching layer against the configured
//! store and serves the operational API.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lexcache::api::{create_router, AppState};
use lexcache::config::Config;
use lexcache::runtime::CacheRuntime;
use lexcache::tasks::ReferenceDataSource;

/// Main entry point for the caching layer's operational server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect to the backing store (capped-backoff retry; a dead store
///    degrades to disabled caching instead of crashing)
/// 4. Run the initial cache warming pass and start the scheduled task
/// 5. Create Axum router with the operational endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting caching layer");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: enabled={}, default_ttl={}s, prefix={}, warming_interval={}s, port={}",
        config.cache_enabled,
        config.default_ttl,
        config.key_prefix,
        config.warming_interval,
        config.server_port
    );

    // Connect the store, warm hot keys, start the scheduled warming task.
    // The standalone server registers the reference-data routine; the host
    // backend adds its query-backed sources when embedding the runtime.
    let mut cache_runtime =
        CacheRuntime::start(&config, vec![Arc::new(ReferenceDataSource::new())]).await;

    let state = AppState::new(cache_runtime.service.clone(), cache_runtime.warmer.clone());
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    cache_runtime.shutdown();
    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating shutdown...");
        }
    }
}
