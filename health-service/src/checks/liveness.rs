use async_trait::async_trait;
use axum::http::StatusCode;
use health_endpoint::{CancellationToken, HealthCheck, HealthCheckResult};
use serde_json::json;

/// Reports the process as alive whenever it can answer at all.
#[derive(Debug, Default)]
pub struct LivenessCheck;

#[async_trait]
impl HealthCheck for LivenessCheck {
    async fn execute(&self, _cancellation: CancellationToken) -> anyhow::Result<HealthCheckResult> {
        let result = HealthCheckResult::json(
            StatusCode::OK,
            &json!({
                "status": "ok",
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            }),
        )?;
        Ok(result)
    }
}
