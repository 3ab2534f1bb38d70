use validator::{Validate, ValidationError};

pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// Settings for a single mapped health-check route.
///
/// Callers customise it through a transform closure handed to
/// [`HealthCheckRouterExt::map_health_check_with`](crate::HealthCheckRouterExt::map_health_check_with):
///
/// ```ignore
/// router.map_health_check_with::<DbCheck, _>(|config| config.with_path("/ready"))?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct HealthEndpointConfig {
    #[validate(custom(function = "validate_path"))]
    path: String,
}

impl HealthEndpointConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn with_path(self, path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Default for HealthEndpointConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HEALTH_PATH)
    }
}

fn validate_path(path: &str) -> Result<(), ValidationError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("empty_path");
        err.message = Some("path must not be empty or whitespace".into());
        return Err(err);
    }
    if !trimmed.starts_with('/') {
        let mut err = ValidationError::new("relative_path");
        err.message = Some("path must start with '/'".into());
        return Err(err);
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    for (index, segment) in segments.iter().enumerate() {
        match segment.chars().next() {
            Some(marker @ (':' | '*')) if segment.len() == 1 => {
                let mut err = ValidationError::new("unnamed_parameter");
                err.message = Some(format!("parameter '{marker}' needs a name").into());
                return Err(err);
            }
            Some('*') if index + 1 < segments.len() => {
                let mut err = ValidationError::new("misplaced_wildcard");
                err.message = Some("wildcard must be the last segment".into());
                return Err(err);
            }
            _ => {}
        }
    }
    Ok(())
}
