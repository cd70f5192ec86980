//! `prometheus-dispatcher` binary: serves `POST /fib` backed by a Fibonacci
//! worker pool.

use std::sync::Arc;

use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing::info;

use prometheus_dispatcher::builders::build_dispatcher;
use prometheus_dispatcher::config::{DispatcherConfig, ServerConfig};
use prometheus_dispatcher::core::{AppResult, Fibonacci};
use prometheus_dispatcher::runtime::{router, SUBMIT_PATH};
use prometheus_dispatcher::util::init_tracing;

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let dispatcher_cfg = DispatcherConfig::from_env().map_err(anyhow::Error::msg)?;
    let server_cfg = ServerConfig::from_env().map_err(anyhow::Error::msg)?;

    let dispatcher = Arc::new(
        build_dispatcher(&dispatcher_cfg, Fibonacci::new(), None)
            .context("failed to start dispatcher")?,
    );

    let app = router(Arc::clone(&dispatcher)).layer(TraceLayer::new_for_http());

    let addr = server_cfg.socket_addr().map_err(anyhow::Error::msg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, path = SUBMIT_PATH, "Accepting submissions");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let report = tokio::task::spawn_blocking(move || dispatcher.shutdown())
        .await
        .context("dispatcher shutdown task failed")?;
    info!(?report, "Dispatcher stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; serve until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
