use std::env;
use std::time::Duration;

use auth::TokenLifetimes;
use auth::WorkFactor;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::domain::user::service::DEFAULT_STORE_TIMEOUT;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub password: WorkFactor,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; the in-memory store is used when absent
    pub url: Option<String>,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    fn default_max_connections() -> u32 {
        5
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "JwtConfig::default_access_token_hours")]
    pub access_token_hours: i64,
    #[serde(default = "JwtConfig::default_refresh_token_hours")]
    pub refresh_token_hours: i64,
}

impl JwtConfig {
    fn default_access_token_hours() -> i64 {
        TokenLifetimes::default().access_token_hours
    }

    fn default_refresh_token_hours() -> i64 {
        TokenLifetimes::default().refresh_token_hours
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            access_token_hours: self.access_token_hours,
            refresh_token_hours: self.refresh_token_hours,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("access_token_hours", &self.access_token_hours)
            .field("refresh_token_hours", &self.refresh_token_hours)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "StoreConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl StoreConfig {
    fn default_timeout_secs() -> u64 {
        DEFAULT_STORE_TIMEOUT.as_secs()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. `SECRET_KEY` for the signing secret
    /// 2. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, DATABASE__URL, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    ///
    /// # Errors
    /// Fails when a source cannot be read, a value has the wrong type, or the
    /// signing secret is empty.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__"))
            .set_override_option("jwt.secret", env::var("SECRET_KEY").ok())?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret is empty: set SECRET_KEY or JWT__SECRET".to_string(),
            ));
        }
        if !self.jwt.lifetimes().is_within_bounds() {
            return Err(ConfigError::Message(format!(
                "token lifetimes must be between 1 and {} hours",
                TokenLifetimes::MAX_HOURS
            )));
        }
        Ok(())
    }
}
