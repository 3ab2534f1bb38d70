//! Prometheus export of the `metrics` recorded by the health endpoints and
//! the request middleware.

use health_endpoint::error::AppError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub const METRICS_PATH: &str = "/metrics";

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder as the global `metrics` recorder.
///
/// Call once at startup, before anything is recorded. Returns early when a
/// recorder from this module is already installed.
pub fn init_metrics() -> Result<(), AppError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        tracing::error!("Failed to install Prometheus recorder: {}", e);
        AppError::InternalError(anyhow::Error::new(e))
    })?;

    if METRICS_HANDLE.set(handle).is_err() {
        tracing::warn!("Metrics handle was already set");
    }
    Ok(())
}

/// Current metrics in the Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}
