//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Access/refresh token configuration.
    pub auth: AuthConfig,
    /// Push messaging provider configuration (optional; push is disabled
    /// when absent).
    #[serde(default)]
    pub push: Option<PushConfig>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Token issuance configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// Access-token lifetime in seconds.
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_secs: i64,
    /// Refresh-token lifetime in days.
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_days: i64,
}

/// Push messaging provider (FCM) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// FCM server key.
    pub server_key: String,
    /// Provider endpoint override (tests point this at a local stub).
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_access_token_ttl() -> i64 {
    // 1 hour
    3600
}

const fn default_refresh_token_ttl() -> i64 {
    30
}

fn default_push_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `KOINONIA_ENV`)
    /// 3. Environment variables with `KOINONIA_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("KOINONIA_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("KOINONIA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("KOINONIA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
