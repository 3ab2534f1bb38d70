//! health-endpoint: bind user-defined health checks to axum routes.
//!
//! ```ignore
//! let registry = HealthCheckRegistry::new();
//! registry.register_check::<DatabaseCheck>();
//!
//! let app = Router::new()
//!     .map_health_check::<DatabaseCheck>("/health")?
//!     .layer(registry.layer());
//! ```
pub mod adapter;
pub mod check;
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod registry;
pub mod result;
pub mod router;

pub use adapter::{RequestCancellation, compose_content_type, run_health_check};
pub use check::HealthCheck;
pub use config::{DEFAULT_HEALTH_PATH, HealthEndpointConfig};
pub use error::AppError;
pub use registry::HealthCheckRegistry;
pub use result::{Charset, HealthCheckResult};
pub use router::HealthCheckRouterExt;

pub use async_trait;
pub use axum;
pub use tokio_util::sync::CancellationToken;
pub use tracing;
