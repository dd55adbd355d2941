//! Workout history commands

use serde::Serialize;

use crate::db::AppState;
use crate::error::TrackerError;
use crate::history::HistoryLog;
use crate::models::HistoryRecord;
use crate::progression::{record_recommendations, Recommendation};

use super::current_profile_id;

/// A logged workout together with the next-session advice derived from it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  #[serde(flatten)]
  pub record: HistoryRecord,
  pub recommendations: Vec<Recommendation>,
}

impl From<HistoryRecord> for HistoryEntry {
  fn from(record: HistoryRecord) -> Self {
    let recommendations = record_recommendations(&record);
    Self {
      record,
      recommendations,
    }
  }
}

async fn history_log(state: &AppState) -> Result<HistoryLog, TrackerError> {
  let profile_id = current_profile_id(state).await?;
  Ok(HistoryLog::new(state.store.clone(), &profile_id))
}

/// Newest first, optionally capped at `limit` entries
pub async fn list_history(
  state: &AppState,
  limit: Option<usize>,
) -> Result<Vec<HistoryEntry>, TrackerError> {
  let records = history_log(state).await?.list().await?;
  Ok(
    records
      .into_iter()
      .take(limit.unwrap_or(usize::MAX))
      .map(HistoryEntry::from)
      .collect(),
  )
}

pub async fn get_history_entry(state: &AppState, id: &str) -> Result<HistoryEntry, TrackerError> {
  Ok(history_log(state).await?.get(id).await?.into())
}

pub async fn delete_history(state: &AppState, id: &str) -> Result<bool, TrackerError> {
  history_log(state).await?.remove(id).await
}
