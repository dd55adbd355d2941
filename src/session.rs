//! Active workout session engine
//!
//! One engine per profile owns the profile's single in-progress workout.
//!
//! Lifecycle:
//! - Idle -> Active via `start` or `redo_from_history`
//! - Active -> Idle via `finish` (logs to history) or `discard`
//! - `resume` rebuilds the in-memory session from its persisted snapshot
//!
//! Every mutation writes a full snapshot before it returns, and the in-memory
//! state only changes once that write succeeded. The snapshot is the sole
//! recovery path after an interruption.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::TrackerError;
use crate::history::HistoryLog;
use crate::models::{ActiveSession, HistoryRecord, Plan, SessionExercise, SetEntry};
use crate::store::{keys, load_json, save_json, KeyValueStore};

/// Source of "now" for start times and durations
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct SessionEngine {
  store: Arc<dyn KeyValueStore>,
  profile_id: String,
  snapshot_key: String,
  history: HistoryLog,
  active: Option<ActiveSession>,
  clock: Clock,
}

impl SessionEngine {
  pub fn new(store: Arc<dyn KeyValueStore>, profile_id: &str) -> Self {
    Self {
      history: HistoryLog::new(store.clone(), profile_id),
      snapshot_key: keys::active_workout(profile_id),
      profile_id: profile_id.to_string(),
      store,
      active: None,
      clock: Arc::new(Utc::now),
    }
  }

  pub fn with_clock(mut self, clock: Clock) -> Self {
    self.clock = clock;
    self
  }

  pub fn profile_id(&self) -> &str {
    &self.profile_id
  }

  pub fn history(&self) -> &HistoryLog {
    &self.history
  }

  /// The in-memory session, if one is loaded
  pub fn current(&self) -> Option<&ActiveSession> {
    self.active.as_ref()
  }

  pub fn is_active(&self) -> bool {
    self.active.is_some()
  }

  /// Snapshot currently on disk, independent of in-memory state
  pub async fn load_persisted(&self) -> Result<Option<ActiveSession>, TrackerError> {
    Ok(load_json(self.store.as_ref(), &self.snapshot_key).await?)
  }

  pub async fn has_persisted(&self) -> Result<bool, TrackerError> {
    Ok(self.store.get(&self.snapshot_key).await?.is_some())
  }

  /// ---------------------------------------------------------------------------
  /// Lifecycle
  /// ---------------------------------------------------------------------------

  /// Start a fresh session from `plan`, replacing any pending one.
  pub async fn start(&mut self, plan: &Plan) -> Result<&ActiveSession, TrackerError> {
    self.warn_if_replacing().await?;
    let session = ActiveSession::from_plan(plan, (self.clock)());
    info!(profile_id = %self.profile_id, plan_id = %plan.id, "starting workout");
    self.commit(session).await
  }

  /// Start a fresh session pre-filled with the sets from `record`.
  /// The originating plan does not need to exist any more.
  pub async fn redo_from_history(
    &mut self,
    record: &HistoryRecord,
  ) -> Result<&ActiveSession, TrackerError> {
    self.warn_if_replacing().await?;
    let session = ActiveSession::from_history(record, (self.clock)());
    info!(profile_id = %self.profile_id, record_id = %record.id, "redoing workout from history");
    self.commit(session).await
  }

  /// Reload the persisted snapshot into memory
  pub async fn resume(&mut self) -> Result<&ActiveSession, TrackerError> {
    let session = self.load_persisted().await?.ok_or_else(|| {
      TrackerError::InvalidState("no active workout to resume".into())
    })?;
    info!(profile_id = %self.profile_id, plan = %session.plan_name, "resumed workout");
    Ok(self.active.insert(session))
  }

  /// Finish the session: clear the snapshot, then log it when anything was
  /// recorded. Returns the appended record. No-op while Idle.
  ///
  /// A session is appended at most once: the snapshot is removed before the
  /// append and written back if the append fails, leaving the session active.
  pub async fn finish(&mut self) -> Result<Option<HistoryRecord>, TrackerError> {
    let Some(session) = self.active.as_ref() else {
      debug!(profile_id = %self.profile_id, "finish called with no active workout");
      return Ok(None);
    };

    let now = (self.clock)();
    if session.start_time > now {
      warn!(
        start_time = %session.start_time,
        now = %now,
        "workout start time is in the future; duration will be negative"
      );
    }

    let record = HistoryRecord::from_session(session, now);
    self.store.remove(&self.snapshot_key).await?;

    if record.is_empty() {
      info!(profile_id = %self.profile_id, "finished workout had no logged sets; not saved");
      self.active = None;
      return Ok(None);
    }

    if let Err(err) = self.history.append(record.clone()).await {
      warn!(profile_id = %self.profile_id, error = %err, "failed to log workout; restoring snapshot");
      if let Err(restore_err) = save_json(self.store.as_ref(), &self.snapshot_key, session).await {
        warn!(profile_id = %self.profile_id, error = %restore_err, "failed to restore workout snapshot");
      }
      return Err(err);
    }

    info!(
      profile_id = %self.profile_id,
      record_id = %record.id,
      duration_min = record.duration,
      sets = record.total_sets(),
      "finished workout"
    );
    self.active = None;
    Ok(Some(record))
  }

  /// Finish straight from the persisted snapshot (no prior `resume`)
  pub async fn finish_persisted(&mut self) -> Result<Option<HistoryRecord>, TrackerError> {
    if self.active.is_none() {
      match self.load_persisted().await? {
        Some(session) => self.active = Some(session),
        None => return Ok(None),
      }
    }
    self.finish().await
  }

  /// Drop the session without logging it. Returns false while Idle.
  pub async fn discard(&mut self) -> Result<bool, TrackerError> {
    if self.active.is_none() {
      debug!(profile_id = %self.profile_id, "discard called with no active workout");
      return Ok(false);
    }
    self.store.remove(&self.snapshot_key).await?;
    self.active = None;
    info!(profile_id = %self.profile_id, "discarded workout");
    Ok(true)
  }

  /// ---------------------------------------------------------------------------
  /// Edits (each persists a full snapshot)
  /// ---------------------------------------------------------------------------

  /// Replace every exercise's rows with the given edited state
  pub async fn record_mutation(
    &mut self,
    exercises: Vec<SessionExercise>,
  ) -> Result<(), TrackerError> {
    self
      .apply(|session| {
        session.exercises = exercises;
        Ok(())
      })
      .await
  }

  /// Append an empty row. Returns the new row count.
  pub async fn add_set(&mut self, exercise_id: &str) -> Result<usize, TrackerError> {
    self
      .apply(|session| {
        let sets = exercise_rows(session, exercise_id)?;
        sets.push(SetEntry::default());
        Ok(sets.len())
      })
      .await
  }

  pub async fn remove_set(
    &mut self,
    exercise_id: &str,
    index: usize,
  ) -> Result<SetEntry, TrackerError> {
    self
      .apply(|session| {
        let sets = exercise_rows(session, exercise_id)?;
        check_index(sets, exercise_id, index)?;
        Ok(sets.remove(index))
      })
      .await
  }

  /// Flip a row's completed flag. Returns the new value.
  pub async fn toggle_set(&mut self, exercise_id: &str, index: usize) -> Result<bool, TrackerError> {
    self
      .apply(|session| {
        let sets = exercise_rows(session, exercise_id)?;
        check_index(sets, exercise_id, index)?;
        let row = &mut sets[index];
        row.completed = !row.completed;
        Ok(row.completed)
      })
      .await
  }

  pub async fn update_set(
    &mut self,
    exercise_id: &str,
    index: usize,
    weight: Option<f64>,
    reps: Option<f64>,
  ) -> Result<(), TrackerError> {
    self
      .apply(|session| {
        let sets = exercise_rows(session, exercise_id)?;
        check_index(sets, exercise_id, index)?;
        sets[index].weight = weight;
        sets[index].reps = reps;
        Ok(())
      })
      .await
  }

  /// ---------------------------------------------------------------------------
  /// Persistence
  /// ---------------------------------------------------------------------------

  /// Edit a copy of the active session and commit it
  async fn apply<T>(
    &mut self,
    edit: impl FnOnce(&mut ActiveSession) -> Result<T, TrackerError>,
  ) -> Result<T, TrackerError> {
    let mut next = self
      .active
      .clone()
      .ok_or_else(|| TrackerError::InvalidState("no active workout".into()))?;
    let result = edit(&mut next)?;
    self.commit(next).await?;
    Ok(result)
  }

  /// Write the snapshot, then adopt `session` as the in-memory state
  async fn commit(&mut self, session: ActiveSession) -> Result<&ActiveSession, TrackerError> {
    save_json(self.store.as_ref(), &self.snapshot_key, &session).await?;
    debug!(profile_id = %self.profile_id, "saved workout snapshot");
    Ok(self.active.insert(session))
  }

  async fn warn_if_replacing(&self) -> Result<(), TrackerError> {
    if self.active.is_some() || self.has_persisted().await? {
      warn!(profile_id = %self.profile_id, "replacing pending workout with a new one");
    }
    Ok(())
  }
}

fn exercise_rows<'a>(
  session: &'a mut ActiveSession,
  exercise_id: &str,
) -> Result<&'a mut Vec<SetEntry>, TrackerError> {
  session
    .exercise_mut(exercise_id)
    .map(SessionExercise::sets_mut)
    .ok_or_else(|| TrackerError::not_found("Exercise", exercise_id))
}

fn check_index(sets: &[SetEntry], exercise_id: &str, index: usize) -> Result<(), TrackerError> {
  if index < sets.len() {
    Ok(())
  } else {
    Err(TrackerError::not_found(
      "Set",
      format!("{} #{}", exercise_id, index + 1),
    ))
  }
}
