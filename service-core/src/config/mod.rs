use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Log levels accepted by `Config::validate`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// HTTP server settings shared by every service binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_write_timeout_secs")]
    pub write_timeout_secs: u64,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_read_timeout_secs() -> u64 {
    10
}

fn default_write_timeout_secs() -> u64 {
    20
}

fn default_shutdown_timeout_secs() -> u64 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            read_timeout_secs: default_read_timeout_secs(),
            write_timeout_secs: default_write_timeout_secs(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl Config {
    /// Upper bound on handling a single request, read plus write.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs.saturating_add(self.write_timeout_secs))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(config_error(format!(
                "log level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }

        if self.host.is_empty() {
            return Err(config_error("host must be defined"));
        }

        // Port 0 asks the OS for an ephemeral port and is only used by tests,
        // which construct the config directly rather than through `load`.
        if self.port == 0 {
            return Err(config_error("port must be > 0"));
        }

        if self.read_timeout_secs == 0 {
            return Err(config_error("read timeout must be > 0s"));
        }

        if self.write_timeout_secs == 0 {
            return Err(config_error("write timeout must be > 0s"));
        }

        if self.shutdown_timeout_secs == 0 {
            return Err(config_error("shutdown timeout must be > 0s"));
        }

        Ok(())
    }
}

/// Build a layered configuration source.
///
/// Sources, later ones winning: an optional `file_name` file in any format the
/// `config` crate recognises by extension (json, yaml, toml), then environment
/// variables of the form `{PREFIX}__SECTION__KEY`. A `.env` file is loaded into
/// the environment first when present.
pub fn layered(file_name: &str, env_prefix: &str) -> Result<Cfg, AppError> {
    dotenvy::dotenv().ok();

    let config = Cfg::builder()
        .add_source(File::with_name(file_name).required(false))
        .add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(config)
}

pub fn config_error(msg: impl Into<String>) -> AppError {
    AppError::ConfigError(anyhow::anyhow!(msg.into()))
}
