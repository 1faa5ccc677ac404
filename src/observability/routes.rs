use crate::config::settings::MetricsConfig;
use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;
use axum::routing::get;
use axum::{response::IntoResponse, Router};
use http::{header::CONTENT_TYPE, StatusCode};
use prometheus::{Encoder, TextEncoder};
use tracing::error;

pub fn router(metrics_config: &MetricsConfig) -> Router<AppState> {
    let mut router = Router::new();
    if metrics_config.is_enabled {
        router = router.route(metrics_config.path.as_str(), get(render_metrics));
    }
    router
}

async fn render_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = get_metrics().registry.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("failed to encode metrics: {}", e);
        return (StatusCode::INTERNAL_SERVER_ERROR, [(CONTENT_TYPE, "text/plain")], String::new());
    }

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        String::from_utf8_lossy(&buffer).into_owned(),
    )
}
