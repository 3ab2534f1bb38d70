use crate::services::METRICS_PATH;
use config::Config as Cfg;
use health_endpoint::config as core_config;
use health_endpoint::error::AppError;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub common: core_config::Config,
    pub health: HealthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthSettings {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_readiness_path")]
    pub readiness_path: String,
    #[serde(default)]
    pub upstream_url: Option<String>,
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct Sections {
    #[serde(default)]
    health: HealthSettings,
}

fn default_path() -> String {
    core_config::DEFAULT_HEALTH_PATH.to_string()
}

fn default_readiness_path() -> String {
    "/ready".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    2
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            path: default_path(),
            readiness_path: default_readiness_path(),
            upstream_url: None,
            upstream_timeout_secs: default_upstream_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Load from an optional `configuration` file and `APP__*` variables,
    /// e.g. `APP__PORT` or `APP__HEALTH__UPSTREAM_URL`.
    pub fn load() -> Result<Self, AppError> {
        Self::from_source(core_config::Config::source()?)
    }

    /// Deserialize the common settings and the `health` section from one
    /// built source, then validate.
    pub fn from_source(source: Cfg) -> Result<Self, AppError> {
        let common: core_config::Config = source.clone().try_deserialize()?;
        let sections: Sections = source.try_deserialize()?;

        let config = ServiceConfig {
            common,
            health: sections.health,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.health.path.trim() == self.health.readiness_path.trim() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "liveness and readiness endpoints share the path {}",
                self.health.path
            )));
        }
        for path in [&self.health.path, &self.health.readiness_path] {
            if path.trim() == METRICS_PATH {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is reserved for the metrics endpoint",
                    METRICS_PATH
                )));
            }
        }
        if self.health.upstream_timeout_secs == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "upstream_timeout_secs must be greater than zero"
            )));
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            health: HealthSettings::default(),
        }
    }
}
