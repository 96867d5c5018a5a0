//! Prometheus metrics
//!
//! Recorder setup plus the counters the ingest path emits.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder
///
/// Idempotent; later calls return the handle installed first.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Render current metrics in the Prometheus exposition format
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Record an ingest decision
pub fn record_ingest(scam_detected: bool) {
    let outcome = if scam_detected { "scam" } else { "clean" };
    metrics::counter!("honeypot_ingest_total", "outcome" => outcome).increment(1);
}

/// Record a persisted report
pub fn record_report() {
    metrics::counter!("honeypot_reports_total").increment(1);
}

/// Record a report persistence failure
pub fn record_report_failure() {
    metrics::counter!("honeypot_report_failures_total").increment(1);
}
