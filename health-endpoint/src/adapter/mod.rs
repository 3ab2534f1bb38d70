//! Per-request execution of a registered health check.

mod body;
mod cancellation;

pub use body::CancellableBody;
pub use cancellation::RequestCancellation;

use crate::check::HealthCheck;
use crate::error::AppError;
use crate::registry::HealthCheckRegistry;
use crate::result::{Charset, HealthCheckResult};
use axum::{
    Extension,
    body::{Body, Bytes},
    http::{
        HeaderValue,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::Response,
};
use metrics::{counter, histogram};
use std::any::type_name;
use std::time::Instant;

/// Handler bound by [`HealthCheckRouterExt`](crate::HealthCheckRouterExt).
///
/// Resolves a fresh `T`, runs it with the request's cancellation token and
/// writes the result. Resolution and execution errors are returned as-is.
#[tracing::instrument(name = "health_check", skip_all, fields(check = type_name::<T>()))]
pub async fn run_health_check<T: HealthCheck>(
    Extension(registry): Extension<HealthCheckRegistry>,
    cancellation: RequestCancellation,
) -> Result<Response, AppError> {
    let check = registry.resolve::<T>()?;

    let start = Instant::now();
    let outcome = check.execute(cancellation.token()).await;
    let elapsed = start.elapsed();

    histogram!("health_check_duration_seconds", "check" => type_name::<T>())
        .record(elapsed.as_secs_f64());

    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(error = %err, "Health check failed");
            counter!("health_check_executions_total", "check" => type_name::<T>(), "status" => "error")
                .increment(1);
            return Err(AppError::CheckFailed(err));
        }
    };

    counter!(
        "health_check_executions_total",
        "check" => type_name::<T>(),
        "status" => result.status_code().as_u16().to_string()
    )
    .increment(1);

    tracing::debug!(
        status = result.status_code().as_u16(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Health check completed"
    );

    write_response(result, cancellation)
}

/// Translate a result into a response.
///
/// Without a body neither the body nor `Content-Length` is set. With one, the
/// UTF-8 bytes are streamed through a [`CancellableBody`] tied to
/// `cancellation`.
pub fn write_response(
    result: HealthCheckResult,
    cancellation: RequestCancellation,
) -> Result<Response, AppError> {
    let mut builder = axum::http::Response::builder().status(result.status_code());

    if let Some(content_type) =
        compose_content_type(result.content_type(), result.content_encoding())
    {
        let value = HeaderValue::from_str(&content_type)
            .map_err(|_| AppError::InvalidHeader(content_type.clone()))?;
        builder = builder.header(CONTENT_TYPE, value);
    }

    let Some(body) = result.into_body() else {
        return Ok(builder.body(Body::empty())?);
    };

    let bytes = Bytes::from(body);
    builder = builder.header(CONTENT_LENGTH, bytes.len());

    Ok(builder.body(Body::from_stream(CancellableBody::new(bytes, cancellation)))?)
}

/// Effective `Content-Type` for a result.
///
/// The charset is appended only when both an encoding and a non-blank content
/// type are present and the content type carries no `charset=` parameter yet.
pub fn compose_content_type(
    content_type: Option<&str>,
    charset: Option<&Charset>,
) -> Option<String> {
    match (content_type, charset) {
        (Some(content_type), Some(charset))
            if !content_type.trim().is_empty() && !has_charset(content_type) =>
        {
            Some(format!("{}; charset={}", content_type, charset))
        }
        (content_type, _) => content_type.map(str::to_owned),
    }
}

fn has_charset(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("charset=")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use futures::StreamExt;
    use tokio_util::sync::CancellationToken;

    fn cancellation() -> RequestCancellation {
        RequestCancellation::new(CancellationToken::new())
    }

    #[test]
    fn test_charset_appended() {
        assert_eq!(
            compose_content_type(Some("text/plain"), Some(&Charset::UTF_8)).as_deref(),
            Some("text/plain; charset=utf-8")
        );
    }

    #[test]
    fn test_existing_charset_kept_regardless_of_case() {
        for content_type in [
            "application/json; charset=utf-8",
            "application/json; CHARSET=ISO-8859-1",
            "text/html;Charset=utf-16",
        ] {
            assert_eq!(
                compose_content_type(Some(content_type), Some(&Charset::new("us-ascii"))).as_deref(),
                Some(content_type)
            );
        }
    }

    #[test]
    fn test_no_encoding_keeps_content_type() {
        assert_eq!(
            compose_content_type(Some("application/json"), None).as_deref(),
            Some("application/json")
        );
        assert_eq!(compose_content_type(None, None), None);
    }

    #[test]
    fn test_blank_content_type_ignores_encoding() {
        assert_eq!(compose_content_type(None, Some(&Charset::UTF_8)), None);
        assert_eq!(
            compose_content_type(Some("  "), Some(&Charset::UTF_8)).as_deref(),
            Some("  ")
        );
    }

    #[test]
    fn test_response_without_body() {
        let result = HealthCheckResult::unhealthy()
            .with_content_type("text/plain")
            .with_content_encoding(Charset::UTF_8);
        let response = write_response(result, cancellation()).unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert!(response.headers().get(CONTENT_LENGTH).is_none());
    }

    #[test]
    fn test_response_without_anything() {
        let response =
            write_response(HealthCheckResult::new(StatusCode::SERVICE_UNAVAILABLE), cancellation())
                .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert!(response.headers().get(CONTENT_LENGTH).is_none());
    }

    #[tokio::test]
    async fn test_content_length_counts_utf8_bytes() {
        let result = HealthCheckResult::text(StatusCode::OK, "héalthy ✓");
        let response = write_response(result, cancellation()).unwrap();

        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "12");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.len(), 12);
        assert_eq!(std::str::from_utf8(&body).unwrap(), "héalthy ✓");
    }

    #[test]
    fn test_invalid_content_type_is_rejected() {
        let result = HealthCheckResult::healthy().with_content_type("text/plain\r\nX-Injected: 1");
        let err = write_response(result, cancellation()).unwrap_err();
        assert!(matches!(err, AppError::InvalidHeader(_)));
    }

    #[tokio::test]
    async fn test_body_stops_when_request_cancelled() {
        let token = CancellationToken::new();
        let payload = "z".repeat(64 * 1024);
        let result = HealthCheckResult::text(StatusCode::OK, payload);
        let response = write_response(result, RequestCancellation::new(token.clone())).unwrap();
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "65536");

        let mut stream = response.into_body().into_data_stream();
        let mut written = stream.next().await.unwrap().unwrap().len();
        token.cancel();
        while let Some(chunk) = stream.next().await {
            written += chunk.unwrap().len();
        }

        assert!(written < 64 * 1024);
    }
}
