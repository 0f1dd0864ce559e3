//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `SONAR` prefix and `__`
//! between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use sonar::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod database;
mod error;
mod interview;
mod server;

pub use ai::{AiBackend, AiConfig, OPENROUTER_BASE_URL};
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use interview::InterviewConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection; in-memory storage when absent
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    /// Language-generation service
    #[serde(default)]
    pub ai: AiConfig,

    /// Interview pacing defaults and presets
    #[serde(default)]
    pub interview: InterviewConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SONAR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `SONAR__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SONAR__DATABASE__URL=...` -> `database.url = ...`
    /// - `SONAR__AI__API_KEY=...` -> `ai.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SONAR")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        self.ai.validate()?;
        self.interview.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
