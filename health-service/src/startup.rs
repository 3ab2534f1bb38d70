use crate::checks::{LivenessCheck, UpstreamCheck};
use crate::config::{HealthSettings, ServiceConfig};
use crate::services::{get_metrics, METRICS_PATH};
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware::from_fn, Extension, Router};
use health_endpoint::error::AppError;
use health_endpoint::middleware::{metrics_middleware, request_id, request_id_middleware};
use health_endpoint::{CancellationToken, HealthCheckRegistry, HealthCheckRouterExt};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    shutdown: CancellationToken,
}

impl Application {
    pub async fn build(config: ServiceConfig) -> Result<Self, AppError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.health.upstream_timeout_secs))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build upstream HTTP client: {}", e);
                AppError::ConfigError(anyhow::Error::new(e))
            })?;

        let registry = register_checks(&config.health, client);
        let shutdown = CancellationToken::new();
        let app = build_router(&config.health, registry, shutdown.clone())?;

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown.clone().cancelled_owned());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            shutdown,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Cancelling this token stops accepting connections and cancels every
    /// in-flight health check.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn register_checks(settings: &HealthSettings, client: reqwest::Client) -> HealthCheckRegistry {
    let registry = HealthCheckRegistry::new();
    let upstream_url = settings.upstream_url.clone();

    registry
        .register_check::<LivenessCheck>()
        .register_check_with(move || UpstreamCheck::new(client.clone(), upstream_url.clone()));

    registry
}

pub fn build_router(
    settings: &HealthSettings,
    registry: HealthCheckRegistry,
    shutdown: CancellationToken,
) -> Result<Router, AppError> {
    let router = Router::new()
        .map_health_check::<LivenessCheck>(&settings.path)?
        .map_health_check_with::<UpstreamCheck, _>(|endpoint| {
            endpoint.with_path(settings.readiness_path.as_str())
        })?
        .route(METRICS_PATH, get(metrics_endpoint))
        .layer(registry.layer())
        .layer(Extension(shutdown))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request_id(request.headers()).unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware));

    Ok(router)
}

async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
