pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod plans;
pub mod profiles;
pub mod progression;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_utils;

use clap::Parser;
use tracing::debug;

use cli::Cli;
use config::AppConfig;
use db::AppState;

/// Parse the command line, open the store and run one command
pub fn run() -> anyhow::Result<()> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let cli = Cli::parse();
  let mut config = AppConfig::from_env()?;
  if cli.verbose {
    config.logging.level = "debug".into();
  }
  logging::init(&config.logging)?;

  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()?;

  runtime.block_on(async move {
    let pool = db::initialize_db(&config)
      .await
      .map_err(|e| anyhow::anyhow!("Failed to initialize database: {}", e))?;
    let state = AppState::from_pool(pool.clone());

    commands::profile::migrate_legacy_data(&state).await?;

    debug!(command = ?cli.command, "executing command");
    let result = cli::execute(&state, cli.command).await;
    pool.close().await;
    result
  })
}
