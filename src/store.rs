//! Durable key-value substrate
//!
//! Every piece of tracker state is a JSON document stored under a string key.
//! Profile-scoped documents carry the profile id in the key (see [`keys`]).

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// ---------------------------------------------------------------------------
/// Key Layout
/// ---------------------------------------------------------------------------

pub mod keys {
  pub const PROFILES: &str = "profiles";
  pub const CURRENT_PROFILE: &str = "current_profile";

  /// Pre-profile layout, read once by the legacy migration
  pub const LEGACY_PLANS: &str = "plans";
  pub const LEGACY_HISTORY: &str = "history";

  pub fn plans(profile_id: &str) -> String {
    format!("plans_{}", profile_id)
  }

  pub fn history(profile_id: &str) -> String {
    format!("history_{}", profile_id)
  }

  pub fn active_workout(profile_id: &str) -> String {
    format!("active_workout_{}", profile_id)
  }
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Store lock poisoned during {0}")]
  LockPoisoned(&'static str),
}

impl Serialize for StoreError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Store Trait
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait KeyValueStore: Send + Sync {
  async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

  /// Insert or overwrite the value under `key`.
  async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

  /// Remove `key`. Returns true if a value existed.
  async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

/// Read and decode a JSON document
pub async fn load_json<T: DeserializeOwned>(
  store: &dyn KeyValueStore,
  key: &str,
) -> Result<Option<T>, StoreError> {
  match store.get(key).await? {
    Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
    None => Ok(None),
  }
}

/// Encode and write a JSON document
pub async fn save_json<T: Serialize + ?Sized + Sync>(
  store: &dyn KeyValueStore,
  key: &str,
  value: &T,
) -> Result<(), StoreError> {
  let raw = serde_json::to_string(value)?;
  debug!(key, bytes = raw.len(), "writing document");
  store.set(key, &raw).await
}

/// ---------------------------------------------------------------------------
/// In-Memory Store
/// ---------------------------------------------------------------------------

/// Map-backed store. Cloning shares the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryStore {
  entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.entries.read().map(|e| e.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
  async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let entries = self
      .entries
      .read()
      .map_err(|_| StoreError::LockPoisoned("read"))?;
    Ok(entries.get(key).cloned())
  }

  async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    let mut entries = self
      .entries
      .write()
      .map_err(|_| StoreError::LockPoisoned("write"))?;
    entries.insert(key.to_string(), value.to_string());
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<bool, StoreError> {
    let mut entries = self
      .entries
      .write()
      .map_err(|_| StoreError::LockPoisoned("remove"))?;
    Ok(entries.remove(key).is_some())
  }
}

/// ---------------------------------------------------------------------------
/// SQLite Store
/// ---------------------------------------------------------------------------

/// Store backed by the `kv_store` table
#[derive(Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
  async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
      .bind(key)
      .fetch_optional(&self.pool)
      .await?;
    Ok(value)
  }

  async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    sqlx::query(
      r#"
      INSERT INTO kv_store (key, value, updated_at)
      VALUES (?1, ?2, ?3)
      ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<bool, StoreError> {
    let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
      .bind(key)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{setup_test_db, teardown_test_db};

  #[test]
  fn test_profile_scoped_keys() {
    assert_eq!(keys::plans("p1"), "plans_p1");
    assert_eq!(keys::history("p1"), "history_p1");
    assert_eq!(keys::active_workout("p1"), "active_workout_p1");
  }

  #[tokio::test]
  async fn test_in_memory_set_get_remove() {
    let store = InMemoryStore::new();
    assert!(store.get("k").await.unwrap().is_none());

    store.set("k", "1").await.unwrap();
    store.set("k", "2").await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2"));

    assert!(store.remove("k").await.unwrap());
    assert!(!store.remove("k").await.unwrap());
    assert!(store.is_empty());
  }

  #[tokio::test]
  async fn test_in_memory_clone_shares_storage() {
    let store = InMemoryStore::new();
    let clone = store.clone();
    store.set("shared", "yes").await.unwrap();
    assert_eq!(clone.get("shared").await.unwrap().as_deref(), Some("yes"));
  }

  #[tokio::test]
  async fn test_json_helpers_roundtrip() {
    let store = InMemoryStore::new();
    save_json(&store, "nums", &vec![1, 2, 3]).await.unwrap();

    let loaded: Option<Vec<i32>> = load_json(&store, "nums").await.unwrap();
    assert_eq!(loaded, Some(vec![1, 2, 3]));

    let missing: Option<Vec<i32>> = load_json(&store, "absent").await.unwrap();
    assert!(missing.is_none());
  }

  #[tokio::test]
  async fn test_load_json_reports_corrupt_documents() {
    let store = InMemoryStore::new();
    store.set("broken", "{not json").await.unwrap();

    let result: Result<Option<Vec<i32>>, _> = load_json(&store, "broken").await;
    assert!(matches!(result, Err(StoreError::Serialization(_))));
  }

  #[tokio::test]
  async fn test_sqlite_store_upserts_and_removes() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());

    store.set("plans_p1", "[]").await.unwrap();
    store.set("plans_p1", "[{\"id\":\"x\"}]").await.unwrap();
    assert_eq!(
      store.get("plans_p1").await.unwrap().as_deref(),
      Some("[{\"id\":\"x\"}]")
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_store")
      .fetch_one(&pool)
      .await
      .expect("Failed to count rows");
    assert_eq!(count, 1);

    assert!(store.remove("plans_p1").await.unwrap());
    assert!(store.get("plans_p1").await.unwrap().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_sqlite_values_survive_new_store_handle() {
    let pool = setup_test_db().await;
    SqliteStore::new(pool.clone())
      .set("current_profile", "\"p1\"")
      .await
      .unwrap();

    let reopened = SqliteStore::new(pool.clone());
    assert_eq!(
      reopened.get("current_profile").await.unwrap().as_deref(),
      Some("\"p1\"")
    );

    teardown_test_db(pool).await;
  }
}
