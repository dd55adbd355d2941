use std::env;

use crate::logging::LoggingConfig;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const DATABASE_URL_VAR: &str = "LIFT_LOG_DATABASE_URL";
pub const MAX_CONNECTIONS_VAR: &str = "LIFT_LOG_MAX_CONNECTIONS";

const DEFAULT_DATABASE_URL: &str = "sqlite://lift-log.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {var}: {value}")]
  Invalid { var: &'static str, value: String },
}

/// ---------------------------------------------------------------------------
/// App Config
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,
  pub max_connections: u32,
  pub logging: LoggingConfig,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      max_connections: DEFAULT_MAX_CONNECTIONS,
      logging: LoggingConfig::default(),
    }
  }
}

impl AppConfig {
  /// Read configuration from the environment (call `dotenvy::dotenv()` first
  /// to pick up a `.env` file)
  pub fn from_env() -> Result<Self, ConfigError> {
    let database_url = env::var(DATABASE_URL_VAR)
      .ok()
      .filter(|v| !v.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    let max_connections = match env::var(MAX_CONNECTIONS_VAR) {
      Ok(raw) => raw
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ConfigError::Invalid {
          var: MAX_CONNECTIONS_VAR,
          value: raw,
        })?,
      Err(_) => DEFAULT_MAX_CONNECTIONS,
    };

    Ok(Self {
      database_url,
      max_connections,
      logging: LoggingConfig::from_env(),
    })
  }
}
