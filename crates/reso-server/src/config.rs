use reso_core::{AggregateOptions, MAX_STORE_CAPACITY, StoreCapacities};
use reso_ingress::DelayConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stores: StoreCapacities,

    #[serde(default)]
    pub analytics: AggregateOptions,

    #[serde(default)]
    pub delays: DelayConfig,

    /// JSON catalog replacing the built-in demo products
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
            stores: StoreCapacities::default(),
            analytics: AggregateOptions::default(),
            delays: DelayConfig::default(),
            catalog_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("RESO_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("RESO_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.port = port,
                Err(_) => eprintln!("Warning: Invalid RESO_PORT '{}', using {}", val, self.port),
            }
        }

        // Logging settings
        if let Ok(val) = std::env::var("RESO_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("RESO_LOG_FORMAT") {
            match val.to_lowercase().as_str() {
                "text" => self.logging.format = LogFormat::Text,
                "json" => self.logging.format = LogFormat::Json,
                _ => eprintln!("Warning: Invalid RESO_LOG_FORMAT '{}', using default", val),
            }
        }

        // Store capacities
        for (var, slot) in [
            ("RESO_SEARCH_CAPACITY", &mut self.stores.search_capacity),
            ("RESO_CLICK_CAPACITY", &mut self.stores.click_capacity),
            ("RESO_CLIENT_CAPACITY", &mut self.stores.client_capacity),
        ] {
            if let Ok(val) = std::env::var(var) {
                match val.parse::<usize>() {
                    Ok(capacity) => *slot = capacity,
                    Err(_) => eprintln!("Warning: Invalid {} '{}', using {}", var, val, slot),
                }
            }
        }

        if let Ok(val) = std::env::var("RESO_CATALOG_PATH") {
            self.catalog_path = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("RESO_DISABLE_DELAYS")
            && val.parse::<bool>().unwrap_or(false)
        {
            self.delays = DelayConfig::disabled();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, capacity) in [
            ("stores.search_capacity", self.stores.search_capacity),
            ("stores.click_capacity", self.stores.click_capacity),
            ("stores.client_capacity", self.stores.client_capacity),
        ] {
            if capacity == 0 || capacity > MAX_STORE_CAPACITY {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 1 and {} (got {})",
                    name, MAX_STORE_CAPACITY, capacity
                )));
            }
        }

        self.analytics.validate().map_err(|e| match e {
            reso_core::Error::InvalidInput(msg) => ConfigError::Invalid(msg),
            other => ConfigError::Invalid(other.to_string()),
        })?;

        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }

        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}
