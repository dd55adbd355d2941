//! Per-profile log of completed workouts, newest first

use std::sync::Arc;
use tracing::info;

use crate::error::TrackerError;
use crate::models::HistoryRecord;
use crate::store::{keys, load_json, save_json, KeyValueStore};

#[derive(Clone)]
pub struct HistoryLog {
  store: Arc<dyn KeyValueStore>,
  key: String,
}

impl HistoryLog {
  pub fn new(store: Arc<dyn KeyValueStore>, profile_id: &str) -> Self {
    Self {
      store,
      key: keys::history(profile_id),
    }
  }

  /// All records, head = most recently appended
  pub async fn list(&self) -> Result<Vec<HistoryRecord>, TrackerError> {
    Ok(load_json(self.store.as_ref(), &self.key).await?.unwrap_or_default())
  }

  pub async fn get(&self, id: &str) -> Result<HistoryRecord, TrackerError> {
    self
      .list()
      .await?
      .into_iter()
      .find(|r| r.id == id)
      .ok_or_else(|| TrackerError::not_found("Workout", id))
  }

  /// Insert at the head. Order is never re-sorted by date.
  pub async fn append(&self, record: HistoryRecord) -> Result<(), TrackerError> {
    let mut records = self.list().await?;
    info!(record_id = %record.id, plan = %record.plan_name, "appending workout to history");
    records.insert(0, record);
    save_json(self.store.as_ref(), &self.key, &records).await?;
    Ok(())
  }

  /// Delete by id. Returns false (and writes nothing) when absent.
  pub async fn remove(&self, id: &str) -> Result<bool, TrackerError> {
    let mut records = self.list().await?;
    let before = records.len();
    records.retain(|r| r.id != id);
    if records.len() == before {
      return Ok(false);
    }
    save_json(self.store.as_ref(), &self.key, &records).await?;
    info!(record_id = id, "removed workout from history");
    Ok(true)
  }

  pub async fn clear(&self) -> Result<(), TrackerError> {
    save_json(self.store.as_ref(), &self.key, &Vec::<HistoryRecord>::new()).await?;
    Ok(())
  }
}
