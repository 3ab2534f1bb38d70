use crate::result::HealthCheckResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A user-supplied health evaluator.
///
/// A fresh instance is built for every request (see
/// [`HealthCheckRegistry`](crate::HealthCheckRegistry)), so implementations
/// hold no state between executions. The token is cancelled when the request
/// is abandoned or the host shuts down; long-running checks should observe it.
///
/// Errors are not converted into an unhealthy result. They surface as a
/// `500` response; implementations that want a specific status for a failed
/// dependency should return that status in the result instead.
#[async_trait]
pub trait HealthCheck: Send + Sync + 'static {
    async fn execute(&self, cancellation: CancellationToken) -> anyhow::Result<HealthCheckResult>;
}
