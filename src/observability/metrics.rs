use std::sync::Arc;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_requests: IntCounterVec,
    pub token_failures: IntCounterVec,
    pub token_issue_duration: HistogramVec,

    // Runtime
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry =
            Registry::new_custom(Some("rtctoken".into()), None).expect("valid registry prefix");

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_requests: IntCounterVec::new(Opts::new("token_requests_total", "Token requests by endpoint"), &["endpoint"]).expect("valid metric"),
            token_failures: IntCounterVec::new(Opts::new("token_failures_total", "Failed token requests by reason"), &["endpoint", "reason"]).expect("valid metric"),
            token_issue_duration: HistogramVec::new(HistogramOpts::new("token_issue_duration_seconds", "Time to parse and sign a token request").buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]), &["endpoint"]).expect("valid metric"),
            up: IntGauge::new("up", "1 if service is serving").expect("valid metric"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_requests.clone())).expect("register metric");
        reg.register(Box::new(metrics.token_failures.clone())).expect("register metric");
        reg.register(Box::new(metrics.token_issue_duration.clone())).expect("register metric");
        reg.register(Box::new(metrics.up.clone())).expect("register metric");

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn metrics_are_registered_once() {
        let a = get_metrics().await;
        let b = get_metrics().await;
        assert!(Arc::ptr_eq(a, b));

        a.token_requests.with_label_values(&["rtc"]).inc();
        let text = crate::observability::routes::render_metrics(&a.registry).unwrap();
        assert!(text.contains("rtctoken_token_requests_total"));
    }
}
