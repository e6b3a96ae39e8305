//! Ingest service entry point.
//!
//! Stores sensor readings (redis with in-memory fallback), serves bounded
//! history queries, and pushes new readings to websocket clients.

use anyhow::Result;
use ingest_service::{create_router, simulation, store, AppState, ClientRegistry};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting ingest service");

    // Read configuration from environment
    let redis_url = env::var("REDIS_URL").ok();
    let http_port: u16 = env::var("HTTP_PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .expect("HTTP_PORT must be a number");
    let metrics_port: u16 = env::var("METRICS_PORT")
        .unwrap_or_else(|_| "9091".to_string())
        .parse()
        .expect("METRICS_PORT must be a number");
    let simulate_interval_secs: u64 = env::var("SIMULATE_INTERVAL_SECS")
        .unwrap_or_else(|_| "5".to_string())
        .parse()
        .expect("SIMULATE_INTERVAL_SECS must be a number");

    info!("Configuration:");
    info!(
        "  REDIS_URL: {}",
        redis_url.as_deref().unwrap_or("(not set)")
    );
    info!("  HTTP_PORT: {}", http_port);
    info!("  METRICS_PORT: {}", metrics_port);
    info!("  SIMULATE_INTERVAL_SECS: {}", simulate_interval_secs);

    // Start Prometheus metrics server
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], metrics_port))
        .install()
        .expect("Failed to start Prometheus exporter");
    info!("Prometheus metrics server started on port {}", metrics_port);

    // Pick the storage backend once for the process lifetime
    let reading_store = store::connect(redis_url.as_deref()).await;
    info!("Storage backend: {}", reading_store.backend_name());

    // Create client registry and application state
    let registry = Arc::new(ClientRegistry::new());
    let state = Arc::new(AppState {
        store: reading_store,
        registry,
    });

    // Optional in-process sensor simulation
    let sim_handle = if simulate_interval_secs > 0 {
        Some(simulation::spawn(
            state.clone(),
            Duration::from_secs(simulate_interval_secs),
        ))
    } else {
        info!("Sensor simulation disabled (SIMULATE_INTERVAL_SECS=0)");
        None
    };

    // Create HTTP router
    let app = create_router(state);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    let listener = TcpListener::bind(addr).await?;
    info!("Ingest service listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /health       - Health check");
    info!("  GET  /data         - Most recent readings (up to 100)");
    info!("  GET  /data/latest  - Most recent reading");
    info!("  POST /data         - Ingest a reading");
    info!("  GET  /ws           - Websocket for real-time updates");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sim_handle {
        handle.abort();
    }

    info!("Ingest service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received terminate signal"),
    }
}
