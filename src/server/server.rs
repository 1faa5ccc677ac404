use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::signal::unix::{signal, SignalKind};
use tokio::select;
use tracing::info;

use crate::config::settings::ServiceConfig;
use crate::observability::metrics::get_metrics;
use crate::observability::routes;
use crate::server::routes::api_router;
use crate::sources::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream: Arc::new(upstream) }
    }
}

pub fn build_router(service_config: &ServiceConfig, state: AppState) -> Router {
    Router::new()
        .merge(api_router())
        .merge(routes::router(&service_config.metrics))
        .with_state(state)
}

/// Serve the aggregation API until SIGINT or SIGTERM.
pub async fn start(service_config: &ServiceConfig, state: AppState) -> Result<()> {
    let app = build_router(service_config, state);

    let bind_addr = format!("{}:{}", service_config.server.host, service_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", bind_addr))?;
    info!("listening on {}", bind_addr);

    get_metrics().up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;
    get_metrics().up.set(0);

    Ok(())
}

async fn shutdown_signal() {
    let (mut sigint, mut sigterm) = match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        _ => {
            tracing::warn!("signal handlers unavailable, running until killed");
            return std::future::pending().await;
        }
    };
    select! {
        _ = sigint.recv() => info!("Received SIGINT (Ctrl+C). Initiating graceful shutdown..."),
        _ = sigterm.recv() => info!("Received SIGTERM. Initiating graceful shutdown..."),
    }
}
