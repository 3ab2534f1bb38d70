use async_trait::async_trait;
use axum::http::StatusCode;
use health_endpoint::{CancellationToken, HealthCheck, HealthCheckResult};
use serde_json::json;

/// Readiness check: the service is ready when its upstream dependency answers
/// with a 2xx. Without a configured upstream it is always ready.
#[derive(Debug, Clone)]
pub struct UpstreamCheck {
    client: reqwest::Client,
    url: Option<String>,
}

impl UpstreamCheck {
    pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl HealthCheck for UpstreamCheck {
    async fn execute(&self, cancellation: CancellationToken) -> anyhow::Result<HealthCheckResult> {
        let Some(url) = self.url.as_deref() else {
            return Ok(HealthCheckResult::json(
                StatusCode::OK,
                &json!({ "status": "ready", "upstream": "not configured" }),
            )?);
        };

        let outcome = tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                tracing::debug!(upstream = url, "Upstream request cancelled");
                return Ok(HealthCheckResult::json(
                    StatusCode::SERVICE_UNAVAILABLE,
                    &json!({ "status": "unavailable", "upstream": url, "error": "cancelled" }),
                )?);
            }
            response = self.client.get(url).send() => response,
        };

        let result = match outcome {
            Ok(response) if response.status().is_success() => HealthCheckResult::json(
                StatusCode::OK,
                &json!({ "status": "ready", "upstream": url }),
            )?,
            Ok(response) => {
                tracing::warn!(upstream = url, status = %response.status(), "Upstream unhealthy");
                HealthCheckResult::json(
                    StatusCode::SERVICE_UNAVAILABLE,
                    &json!({
                        "status": "unavailable",
                        "upstream": url,
                        "error": format!("HTTP {}", response.status())
                    }),
                )?
            }
            Err(e) => {
                tracing::warn!(upstream = url, error = %e, "Upstream unreachable");
                HealthCheckResult::json(
                    StatusCode::SERVICE_UNAVAILABLE,
                    &json!({ "status": "unavailable", "upstream": url, "error": e.to_string() }),
                )?
            }
        };

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(result: &HealthCheckResult) -> serde_json::Value {
        serde_json::from_str(result.body().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_ready_without_upstream() {
        let check = UpstreamCheck::new(reqwest::Client::new(), None);
        let result = check.execute(CancellationToken::new()).await.unwrap();

        assert_eq!(result.status_code(), StatusCode::OK);
        assert_eq!(body(&result)["upstream"], "not configured");
    }

    #[tokio::test]
    async fn test_cancelled_check_is_unavailable() {
        let token = CancellationToken::new();
        token.cancel();
        let check = UpstreamCheck::new(
            reqwest::Client::new(),
            Some("http://127.0.0.1:9/health".to_string()),
        );

        let result = check.execute(token).await.unwrap();

        assert_eq!(result.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body(&result)["error"], "cancelled");
    }
}
