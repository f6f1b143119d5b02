//! Prometheus counters
//!
//! Counters are no-ops until [`install_recorder`] runs, so services and tests
//! can record unconditionally.

use anyhow::Result;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const ANALYSES_TOTAL: &str = "drift_analyses_total";
pub const STORE_WRITE_FAILURES_TOTAL: &str = "drift_store_write_failures_total";

/// Install the global recorder and return the handle used by `/metrics`
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;

    describe_counter!(ANALYSES_TOTAL, "Completed drift analyses by source and drift level");
    describe_counter!(
        STORE_WRITE_FAILURES_TOTAL,
        "Swallowed persistence failures by record kind"
    );

    Ok(handle)
}

/// One finished analysis; `source` is `live` or `window`
pub fn record_analysis(source: &'static str, drift_level: &'static str) {
    counter!(ANALYSES_TOTAL, "source" => source, "drift_level" => drift_level).increment(1);
}

/// A non-fatal write that was logged and dropped
pub fn record_write_failure(record: &'static str) {
    counter!(STORE_WRITE_FAILURES_TOTAL, "record" => record).increment(1);
}
