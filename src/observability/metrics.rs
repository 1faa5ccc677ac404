use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use std::sync::OnceLock;


// Declare the static OnceLock to hold the Metrics.
static METRICS_INSTANCE: OnceLock<Arc<Metrics>> = OnceLock::new();

/// Lazily initializes and gets a reference to the process-wide `Metrics`.
pub fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| {
        info!("Initializing Metrics ...");
        Metrics::new()
    })
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Upstream metrics
    pub upstream_requests: IntCounterVec,
    pub upstream_failures: IntCounterVec,
    pub upstream_duration: HistogramVec,
    pub pages_fetched: IntCounterVec,

    // Token metrics
    pub token_refreshes: IntCounterVec,
    pub forced_refreshes: IntCounter,
    pub token_expiry_unix: IntGauge,

    // Runtime
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("bqeproxy".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Upstream
            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total", "Total GET requests to the core API"),&["resource"],).unwrap(),
            upstream_failures: IntCounterVec::new(Opts::new("upstream_failures_total", "Failed core API requests by status"),&["resource", "status"],).unwrap(),
            upstream_duration: HistogramVec::new(HistogramOpts::new("upstream_request_duration_seconds", "Core API request duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["resource"],).unwrap(),
            pages_fetched: IntCounterVec::new(Opts::new("pages_fetched_total", "Pages fetched while walking collections"),&["resource"],).unwrap(),

            // Token
            token_refreshes: IntCounterVec::new(Opts::new("token_refreshes_total", "Refresh-token grants by outcome"),&["outcome"],).unwrap(),
            forced_refreshes: IntCounter::new("forced_refreshes_total", "Refreshes forced by a 401 from the core API").unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the cached access token").unwrap(),

            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.upstream_requests.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_failures.clone())).unwrap();
        reg.register(Box::new(metrics.upstream_duration.clone())).unwrap();
        reg.register(Box::new(metrics.pages_fetched.clone())).unwrap();
        reg.register(Box::new(metrics.token_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.forced_refreshes.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}

/// Label for a request URL: the first path segment after the API base.
pub fn resource_label<'a>(api_base: &str, url: &'a str) -> &'a str {
    url.strip_prefix(api_base)
        .unwrap_or(url)
        .trim_start_matches('/')
        .split(['/', '?'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_label_takes_first_segment() {
        let base = "https://api.bqecore.com/api";
        assert_eq!(resource_label(base, "https://api.bqecore.com/api/client/42"), "client");
        assert_eq!(resource_label(base, "https://api.bqecore.com/api/timeentry"), "timeentry");
        assert_eq!(resource_label(base, "https://api.bqecore.com/api"), "unknown");
    }

    #[test]
    fn registry_exposes_counters() {
        let metrics = get_metrics();
        metrics.token_refreshes.with_label_values(&["success"]).inc();
        let mut buffer = Vec::new();
        prometheus::Encoder::encode(&prometheus::TextEncoder::new(), &metrics.registry.gather(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("bqeproxy_token_refreshes_total"));
    }
}
