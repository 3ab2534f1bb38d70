use crate::check::HealthCheck;
use crate::error::AppError;
use axum::Extension;
use dashmap::DashMap;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

type Factory = Arc<dyn Fn() -> Box<dyn Any + Send> + Send + Sync>;

/// Transient registrations of health-check implementations, keyed by type.
///
/// Every [`resolve`](Self::resolve) runs the registered constructor, so no
/// check instance is ever shared between requests. Clones share the same
/// registrations.
#[derive(Clone, Default)]
pub struct HealthCheckRegistry {
    factories: Arc<DashMap<TypeId, Factory>>,
}

impl HealthCheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` with `T::default()` as its constructor.
    pub fn register_check<T>(&self) -> &Self
    where
        T: HealthCheck + Default,
    {
        self.register_check_with(T::default)
    }

    /// Register `T` with a custom constructor, for checks that need shared
    /// clients or configuration. Replaces any earlier registration of `T`.
    pub fn register_check_with<T, F>(&self, factory: F) -> &Self
    where
        T: HealthCheck,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move || Box::new(factory()) as Box<dyn Any + Send>);
        if self.factories.insert(TypeId::of::<T>(), factory).is_some() {
            tracing::debug!(check = type_name::<T>(), "Replaced health check registration");
        } else {
            tracing::debug!(check = type_name::<T>(), "Registered health check");
        }
        self
    }

    /// Construct a fresh instance of `T`.
    pub fn resolve<T: HealthCheck>(&self) -> Result<T, AppError> {
        // Clone the constructor out so the shard lock is not held while it runs.
        let factory = self
            .factories
            .get(&TypeId::of::<T>())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(AppError::CheckNotRegistered(type_name::<T>()))?;

        factory()
            .downcast::<T>()
            .map(|check| *check)
            .map_err(|_| AppError::InternalError(anyhow::anyhow!(
                "factory for {} produced a different type",
                type_name::<T>()
            )))
    }

    pub fn contains<T: HealthCheck>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Layer that makes this registry the resolver for every request routed
    /// through it.
    pub fn layer(&self) -> Extension<Self> {
        Extension(self.clone())
    }
}

impl std::fmt::Debug for HealthCheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthCheckRegistry")
            .field("registrations", &self.factories.len())
            .finish()
    }
}
