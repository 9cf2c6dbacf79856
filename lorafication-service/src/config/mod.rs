use serde::Deserialize;
use service_core::config::{self as core_config, config_error};
use service_core::error::AppError;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Environment variable prefix, e.g. `LORAFICATION__DATABASE__HOST`.
pub const ENV_PREFIX: &str = "LORAFICATION";

/// Optional config file name; any extension the `config` crate knows works.
pub const CONFIG_FILE: &str = "configuration";

#[derive(Debug, Clone, Deserialize)]
pub struct LoraficationConfig {
    #[serde(default)]
    pub server: core_config::Config,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Span export is off unless an OTLP collector endpoint is configured.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Connection attempts, one second apart, before startup gives up.
    pub connect_attempts: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: "root".to_string(),
            password: "root".to_string(),
            name: "lorafication".to_string(),
            host: "db".to_string(),
            port: 5432,
            max_connections: 10,
            min_connections: 1,
            connect_attempts: 60,
        }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(PgSslMode::Disable)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Sender address; the SMTP user is used when left empty.
    pub from_email: String,
    pub enabled: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from_email: String::new(),
            enabled: false,
        }
    }
}

impl SmtpConfig {
    pub fn sender(&self) -> &str {
        if self.from_email.is_empty() {
            &self.user
        } else {
            &self.from_email
        }
    }
}

impl LoraficationConfig {
    pub fn load() -> Result<Self, AppError> {
        let config: LoraficationConfig =
            core_config::layered(CONFIG_FILE, ENV_PREFIX)?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.server.validate()?;

        let db = &self.database;
        if db.user.is_empty() {
            return Err(config_error("db user must be defined"));
        }
        if db.password.is_empty() {
            return Err(config_error("db pass must be defined"));
        }
        if db.name.is_empty() {
            return Err(config_error("db name must be defined"));
        }
        if db.host.is_empty() {
            return Err(config_error("db host must be defined"));
        }
        if db.port == 0 {
            return Err(config_error("db port must be > 0"));
        }
        if db.max_connections == 0 || db.min_connections > db.max_connections {
            return Err(config_error(
                "db connections must satisfy 0 < min <= max",
            ));
        }

        if self.smtp.enabled {
            if self.smtp.host.is_empty() {
                return Err(config_error("smtp host must be defined"));
            }
            if self.smtp.user.is_empty() {
                return Err(config_error("smtp user must be defined"));
            }
        }

        Ok(())
    }
}
