//! Application configuration
//!
//! Defaults, overridden by an optional `config.yaml` file, overridden in turn
//! by environment variables for the values that differ per deployment:
//! `SERVER_ADDRESS`, `POSTGRES_USER` and `POSTGRES_PASSWORD`.

use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:8087`
    pub address: String,
}

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                address: "0.0.0.0:8087".to_string(),
            },
            postgres: PostgresConfig {
                host: "localhost".to_string(),
                port: 5432,
                username: "postgres".to_string(),
                password: "postgres".to_string(),
                database: "subscriptions".to_string(),
                ssl_mode: "disable".to_string(),
            },
        }
    }
}

impl Config {
    /// Load `config.yaml` from the working directory, if present.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("config.yaml")
    }

    /// Load configuration from the given file, falling back to defaults for
    /// anything it omits, then apply environment overrides.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        let mut config: Config = builder.build()?.try_deserialize()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Credentials and listen address come from the environment when set.
    fn apply_env_overrides(&mut self) {
        if let Ok(address) = env::var("SERVER_ADDRESS") {
            if !address.is_empty() {
                self.server.address = address;
            }
        }
        if let Ok(username) = env::var("POSTGRES_USER") {
            if !username.is_empty() {
                self.postgres.username = username;
            }
        }
        if let Ok(password) = env::var("POSTGRES_PASSWORD") {
            if !password.is_empty() {
                self.postgres.password = password;
            }
        }
    }
}
