//! Active workout commands
//!
//! Exercises can be referenced by 1-based position, id, or name; set numbers
//! are 1-based.

use crate::db::AppState;
use crate::error::TrackerError;
use crate::models::{ActiveSession, HistoryRecord, SessionExercise};
use crate::plans::PlanRepository;
use crate::session::SessionEngine;

use super::profile_engine;

/// Engine with the persisted session loaded into memory
async fn resumed_engine(state: &AppState) -> Result<SessionEngine, TrackerError> {
  let mut engine = profile_engine(state).await?;
  engine.resume().await?;
  Ok(engine)
}

/// Resolve an exercise reference against the session
pub fn resolve_exercise<'a>(
  session: &'a ActiveSession,
  reference: &str,
) -> Result<&'a SessionExercise, TrackerError> {
  let reference = reference.trim();
  if let Ok(position) = reference.parse::<usize>() {
    if let Some(exercise) = position.checked_sub(1).and_then(|i| session.exercises.get(i)) {
      return Ok(exercise);
    }
  }
  session
    .exercises
    .iter()
    .find(|e| e.id == reference)
    .or_else(|| {
      session
        .exercises
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(reference))
    })
    .ok_or_else(|| TrackerError::not_found("Exercise", reference))
}

fn set_index(set_number: usize) -> Result<usize, TrackerError> {
  set_number
    .checked_sub(1)
    .ok_or_else(|| TrackerError::MalformedInput("set numbers start at 1".into()))
}

fn exercise_id(engine: &SessionEngine, reference: &str) -> Result<String, TrackerError> {
  let session = engine
    .current()
    .ok_or_else(|| TrackerError::InvalidState("no active workout".into()))?;
  Ok(resolve_exercise(session, reference)?.id.clone())
}

fn snapshot(engine: &SessionEngine) -> Result<ActiveSession, TrackerError> {
  engine
    .current()
    .cloned()
    .ok_or_else(|| TrackerError::InvalidState("no active workout".into()))
}

/// ---------------------------------------------------------------------------
/// Lifecycle
/// ---------------------------------------------------------------------------

pub async fn start_workout(state: &AppState, plan_id: &str) -> Result<ActiveSession, TrackerError> {
  let mut engine = profile_engine(state).await?;
  let plan = PlanRepository::new(state.store.clone(), engine.profile_id())
    .get(plan_id)
    .await?;
  engine.start(&plan).await.cloned()
}

pub async fn redo_workout(state: &AppState, record_id: &str) -> Result<ActiveSession, TrackerError> {
  let mut engine = profile_engine(state).await?;
  let record = engine.history().get(record_id).await?;
  engine.redo_from_history(&record).await.cloned()
}

pub async fn get_active_workout(state: &AppState) -> Result<Option<ActiveSession>, TrackerError> {
  profile_engine(state).await?.load_persisted().await
}

pub async fn finish_workout(state: &AppState) -> Result<Option<HistoryRecord>, TrackerError> {
  profile_engine(state).await?.finish_persisted().await
}

/// Returns false when there was nothing to discard
pub async fn discard_workout(state: &AppState) -> Result<bool, TrackerError> {
  let mut engine = profile_engine(state).await?;
  if !engine.has_persisted().await? {
    return Ok(false);
  }
  engine.resume().await?;
  engine.discard().await
}

/// ---------------------------------------------------------------------------
/// Set Edits
/// ---------------------------------------------------------------------------

pub async fn add_set(state: &AppState, exercise: &str) -> Result<ActiveSession, TrackerError> {
  let mut engine = resumed_engine(state).await?;
  let id = exercise_id(&engine, exercise)?;
  engine.add_set(&id).await?;
  snapshot(&engine)
}

pub async fn remove_set(
  state: &AppState,
  exercise: &str,
  set_number: usize,
) -> Result<ActiveSession, TrackerError> {
  let mut engine = resumed_engine(state).await?;
  let id = exercise_id(&engine, exercise)?;
  engine.remove_set(&id, set_index(set_number)?).await?;
  snapshot(&engine)
}

pub async fn toggle_set(
  state: &AppState,
  exercise: &str,
  set_number: usize,
) -> Result<ActiveSession, TrackerError> {
  let mut engine = resumed_engine(state).await?;
  let id = exercise_id(&engine, exercise)?;
  engine.toggle_set(&id, set_index(set_number)?).await?;
  snapshot(&engine)
}

/// Overwrite a set's weight and reps. Blank or non-numeric text clears the
/// field.
pub async fn update_set(
  state: &AppState,
  exercise: &str,
  set_number: usize,
  weight: &str,
  reps: &str,
) -> Result<ActiveSession, TrackerError> {
  use crate::models::SetEntry;

  let mut engine = resumed_engine(state).await?;
  let id = exercise_id(&engine, exercise)?;
  engine
    .update_set(
      &id,
      set_index(set_number)?,
      SetEntry::parse_field(weight),
      SetEntry::parse_field(reps),
    )
    .await?;
  snapshot(&engine)
}
