//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - Fixed clocks
//! - A store that fails on demand

use crate::models::{ExerciseTemplate, HistoryRecord, LoggedExercise, LoggedSet, Plan};
use crate::session::Clock;
use crate::store::{InMemoryStore, KeyValueStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Fixed reference instant used by engine tests
pub fn test_time() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 5, 3, 18, 0, 0).unwrap()
}

/// Clock that always returns `at`
pub fn fixed_clock(at: DateTime<Utc>) -> Clock {
  Arc::new(move || at)
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Two-exercise plan with stable exercise ids
pub fn mock_plan() -> Plan {
  Plan {
    id: "plan-push".to_string(),
    name: "Push Day".to_string(),
    exercises: vec![
      ExerciseTemplate {
        id: "ex-bench".to_string(),
        name: "Bench Press".to_string(),
        default_sets: 3,
      },
      ExerciseTemplate {
        id: "ex-dips".to_string(),
        name: "Dips".to_string(),
        default_sets: 2,
      },
    ],
    created_at: test_time() - Duration::days(30),
  }
}

/// Completed workout logged `days_ago` days before [`test_time`]
pub fn mock_history_record(id: &str, days_ago: i64) -> HistoryRecord {
  mock_history_record_at(id, test_time() - Duration::days(days_ago))
}

/// Completed workout logged at `date`
pub fn mock_history_record_at(id: &str, date: DateTime<Utc>) -> HistoryRecord {
  HistoryRecord {
    id: id.to_string(),
    plan_id: Some("plan-full".to_string()),
    plan_name: "Full Body".to_string(),
    date,
    duration: 55,
    exercises: vec![
      LoggedExercise {
        name: "Bench Press".to_string(),
        sets: vec![
          LoggedSet { weight: 80.0, reps: 8.0 },
          LoggedSet { weight: 85.0, reps: 5.0 },
        ],
      },
      LoggedExercise {
        name: "Squat".to_string(),
        sets: vec![
          LoggedSet { weight: 100.0, reps: 8.0 },
          LoggedSet { weight: 100.0, reps: 8.0 },
        ],
      },
    ],
  }
}

/// ---------------------------------------------------------------------------
/// Failing Store
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
  Get,
  Set,
  Remove,
}

/// In-memory store that fails queued operations once each. A failure matches
/// an operation and key prefix; everything else goes to the inner store.
#[derive(Clone, Default)]
pub struct FlakyStore {
  inner: InMemoryStore,
  failures: Arc<Mutex<Vec<(StoreOp, String)>>>,
}

impl FlakyStore {
  pub fn new(inner: InMemoryStore) -> Self {
    Self {
      inner,
      failures: Arc::default(),
    }
  }

  /// Make the next `op` on a key starting with `key_prefix` fail
  pub fn fail_once(&self, op: StoreOp, key_prefix: &str) {
    self
      .failures
      .lock()
      .unwrap()
      .push((op, key_prefix.to_string()));
  }

  fn check(&self, op: StoreOp, key: &str) -> Result<(), StoreError> {
    let mut failures = self.failures.lock().unwrap();
    match failures
      .iter()
      .position(|(o, prefix)| *o == op && key.starts_with(prefix.as_str()))
    {
      Some(i) => {
        failures.remove(i);
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
      }
      None => Ok(()),
    }
  }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
  async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    self.check(StoreOp::Get, key)?;
    self.inner.get(key).await
  }

  async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    self.check(StoreOp::Set, key)?;
    self.inner.set(key, value).await
  }

  async fn remove(&self, key: &str) -> Result<bool, StoreError> {
    self.check(StoreOp::Remove, key)?;
    self.inner.remove(key).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name = 'kv_store'",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_flaky_store_fails_matching_op_once() {
    let store = FlakyStore::default();
    store.fail_once(StoreOp::Set, "plans_");

    assert!(store.set("history_p1", "[]").await.is_ok());
    assert!(matches!(
      store.set("plans_p1", "[]").await,
      Err(StoreError::Database(_))
    ));
    assert!(store.set("plans_p1", "[]").await.is_ok());
    assert_eq!(store.get("plans_p1").await.unwrap().as_deref(), Some("[]"));
  }

  #[test]
  fn test_fixed_clock_is_stable() {
    let clock = fixed_clock(test_time());
    assert_eq!(clock(), clock());
    assert_eq!(clock(), test_time());
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let plan = mock_plan();
    assert_eq!(plan.exercises.len(), 2);
    assert!(plan.exercises.iter().all(|e| e.default_sets >= 1));

    let record = mock_history_record("r1", 2);
    assert_eq!(record.date, test_time() - Duration::days(2));
    assert_eq!(record.total_sets(), 4);
  }
}
