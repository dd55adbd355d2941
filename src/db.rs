use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::store::{KeyValueStore, SqliteStore};

pub type DbPool = SqlitePool;

/// Application state shared by every command
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn KeyValueStore>,
}

impl AppState {
  pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
    Self { store }
  }

  pub fn from_pool(pool: DbPool) -> Self {
    Self::new(Arc::new(SqliteStore::new(pool)))
  }
}

/// File backing a `sqlite:` URL, None for in-memory databases
fn sqlite_file_path(url: &str) -> Option<PathBuf> {
  let rest = url
    .strip_prefix("sqlite://")
    .or_else(|| url.strip_prefix("sqlite:"))?;
  let path = rest.split('?').next().unwrap_or_default();
  if path.is_empty() || path == ":memory:" {
    None
  } else {
    Some(PathBuf::from(path))
  }
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(
  config: &AppConfig,
) -> Result<DbPool, Box<dyn std::error::Error + Send + Sync>> {
  if let Some(path) = sqlite_file_path(&config.database_url) {
    // Create the parent directory if it doesn't exist
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
      fs::create_dir_all(dir)?;
    }
    info!(path = %path.display(), "initializing database");
  }

  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.database_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("database initialized");

  Ok(pool)
}
