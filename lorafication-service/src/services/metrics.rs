//! Metrics collection for lorafication-service.
//!
//! Counters and histograms go through the `metrics` facade; `init_metrics`
//! installs the Prometheus recorder that `/metrics` renders. Until it is
//! installed (unit and router tests) every recording is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;
use std::time::Duration;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the process-wide Prometheus recorder.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("install Prometheus recorder: {}", e)))?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| AppError::ConfigError(anyhow::anyhow!("metrics already initialized")))?;

    Ok(())
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Outcome of one notify request: `sent` or a [`NotifyError`](super::NotifyError) kind.
pub fn record_notification(status: &'static str) {
    counter!("lorafication_notifications_total", "status" => status).increment(1);
}

/// One outbound email attempt.
pub fn record_email(status: &'static str) {
    counter!("lorafication_emails_sent_total", "status" => status).increment(1);
}

pub fn record_db_query(query: &'static str, elapsed: Duration) {
    histogram!("lorafication_db_query_duration_seconds", "query" => query)
        .record(elapsed.as_secs_f64());
}
