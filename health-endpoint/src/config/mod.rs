mod endpoint;

pub use endpoint::{DEFAULT_HEALTH_PATH, HealthEndpointConfig};

use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Ok(Self::source()?.try_deserialize()?)
    }

    /// The merged `configuration` file and `APP__*` environment, for hosts
    /// that deserialize their own sections next to this one.
    pub fn source() -> Result<Cfg, AppError> {
        dotenvy::dotenv().ok();

        Ok(Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}
