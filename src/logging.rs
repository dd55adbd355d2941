//! Structured logging setup
//!
//! Logs go to stderr so command output on stdout stays clean.

use std::env;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  /// One JSON object per line
  Json,
  /// Multi-line, human friendly
  Pretty,
  /// Single line per event
  Compact,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
  /// `EnvFilter` directive, e.g. `info` or `lift_log_lib=debug`
  pub level: String,
  pub format: LogFormat,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".into(),
      format: LogFormat::Pretty,
    }
  }
}

impl LoggingConfig {
  pub fn from_env() -> Self {
    let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let format = match env::var("LOG_FORMAT").as_deref() {
      Ok("json") => LogFormat::Json,
      Ok("compact") => LogFormat::Compact,
      _ => LogFormat::Pretty,
    };
    Self { level, format }
  }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
  let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);

  let result = match config.format {
    LogFormat::Json => builder.json().try_init(),
    LogFormat::Compact => builder.compact().try_init(),
    LogFormat::Pretty => builder.pretty().try_init(),
  };
  result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
