//! Lending desk HTTP server.
//!
//! ```bash
//! PORT=8080 RUST_LOG=info,stockroom_desk=debug cargo run --bin stockroom-server
//! ```

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
use stockroom_desk::server::{AppState, build_router};
use stockroom_desk::{Config, DeskEnvironment, DeskState, LendingDesk, seed};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stockroom_desk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        bind = %config.bind_address(),
        metrics = %config.metrics_address(),
        seed = config.desk.seed_demo_data,
        "Configuration loaded"
    );

    let metrics_addr: SocketAddr = config
        .metrics_address()
        .parse()
        .context("invalid metrics address")?;
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .context("failed to install Prometheus exporter")?;

    let environment = DeskEnvironment::production();
    let initial = if config.desk.seed_demo_data {
        seed::demo_state(environment.clock.now())
    } else {
        DeskState::new()
    };
    tracing::info!(
        components = initial.catalog.len(),
        requests = initial.requests.len(),
        "Desk state prepared"
    );

    let desk = LendingDesk::new(initial, environment, &config.desk);
    let app = build_router(AppState::new(desk.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), "Lending desk listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down gracefully...");
        })
        .await
        .context("server error")?;

    desk.shutdown(Duration::from_secs(config.server.shutdown_timeout))
        .await
        .context("store did not drain")?;

    tracing::info!("Shutdown complete");
    Ok(())
}
