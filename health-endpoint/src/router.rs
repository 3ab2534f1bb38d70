use crate::adapter::run_health_check;
use crate::check::HealthCheck;
use crate::config::HealthEndpointConfig;
use crate::error::AppError;
use axum::http::{StatusCode, header::ALLOW};
use axum::{Router, response::IntoResponse, routing::get};
use std::any::type_name;
use validator::Validate;

/// Binds health-check endpoints onto an existing router.
///
/// The bound handler resolves the check from the [`HealthCheckRegistry`]
/// extension, so the host must add
/// [`HealthCheckRegistry::layer`](crate::HealthCheckRegistry::layer) to the
/// router. Blank or relative paths, and paths with an unnamed or misplaced
/// parameter, are rejected before anything is bound.
///
/// [`HealthCheckRegistry`]: crate::HealthCheckRegistry
pub trait HealthCheckRouterExt: Sized {
    /// Bind `GET path` to `T`. Every other method, HEAD included, gets 405.
    fn map_health_check<T: HealthCheck>(self, path: &str) -> Result<Self, AppError>;

    /// Bind `T` at the path produced by `configure` from the default
    /// [`HealthEndpointConfig`].
    fn map_health_check_with<T, F>(self, configure: F) -> Result<Self, AppError>
    where
        T: HealthCheck,
        F: FnOnce(HealthEndpointConfig) -> HealthEndpointConfig;
}

impl<S> HealthCheckRouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn map_health_check<T: HealthCheck>(self, path: &str) -> Result<Self, AppError> {
        self.map_health_check_with::<T, _>(|config| config.with_path(path))
    }

    fn map_health_check_with<T, F>(self, configure: F) -> Result<Self, AppError>
    where
        T: HealthCheck,
        F: FnOnce(HealthEndpointConfig) -> HealthEndpointConfig,
    {
        let config = configure(HealthEndpointConfig::default());
        config.validate()?;

        let path = config.path().trim();
        tracing::info!(path, check = type_name::<T>(), "Mapped health check endpoint");

        // axum answers HEAD with the GET handler unless HEAD is bound itself.
        let route = get(run_health_check::<T>).head(method_not_allowed);
        Ok(self.route(path, route))
    }
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, "GET")])
}
