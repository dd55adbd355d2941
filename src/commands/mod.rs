//! Operations behind each user action
//!
//! Each command loads what it needs from the store, performs one action and
//! returns. Nothing is kept in memory between commands, so workout commands
//! always go through the persisted snapshot.

pub mod analysis;
pub mod history;
pub mod plan;
pub mod profile;
pub mod workout;

use crate::db::AppState;
use crate::error::TrackerError;
use crate::profiles::ProfileManager;
use crate::session::SessionEngine;

/// Id of the selected profile
pub async fn current_profile_id(state: &AppState) -> Result<String, TrackerError> {
  let profiles = ProfileManager::load(state.store.clone()).await?;
  profiles
    .current_profile_id()
    .map(str::to_string)
    .ok_or(TrackerError::NoProfileSelected)
}

/// Session engine for the selected profile
pub async fn profile_engine(state: &AppState) -> Result<SessionEngine, TrackerError> {
  let profile_id = current_profile_id(state).await?;
  Ok(SessionEngine::new(state.store.clone(), &profile_id))
}
