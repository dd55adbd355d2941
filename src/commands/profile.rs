//! Profile commands

use serde::Serialize;

use crate::db::AppState;
use crate::error::TrackerError;
use crate::history::HistoryLog;
use crate::models::Profile;
use crate::plans::PlanRepository;
use crate::profiles::ProfileManager;

use super::current_profile_id;

#[derive(Debug, Clone, Serialize)]
pub struct ProfileList {
  pub profiles: Vec<Profile>,
  pub current_profile_id: Option<String>,
}

/// Run the one-time legacy migration. Safe to call on every startup.
pub async fn migrate_legacy_data(state: &AppState) -> Result<bool, TrackerError> {
  let mut profiles = ProfileManager::load(state.store.clone()).await?;
  profiles.migrate_legacy_data().await
}

pub async fn list_profiles(state: &AppState) -> Result<ProfileList, TrackerError> {
  let profiles = ProfileManager::load(state.store.clone()).await?;
  Ok(ProfileList {
    current_profile_id: profiles.current_profile_id().map(str::to_string),
    profiles: profiles.profiles().to_vec(),
  })
}

/// Create a profile, selecting it when `select` is set or when it is the
/// only profile
pub async fn create_profile(
  state: &AppState,
  name: &str,
  select: bool,
) -> Result<Profile, TrackerError> {
  let mut profiles = ProfileManager::load(state.store.clone()).await?;
  let profile = profiles.create(name).await?;
  if select || profiles.current_profile().is_none() {
    profiles.select(&profile.id).await?;
  }
  Ok(profile)
}

pub async fn select_profile(state: &AppState, id: &str) -> Result<Profile, TrackerError> {
  let mut profiles = ProfileManager::load(state.store.clone()).await?;
  profiles.select(id).await.cloned()
}

pub async fn delete_profile(state: &AppState, id: &str) -> Result<bool, TrackerError> {
  let mut profiles = ProfileManager::load(state.store.clone()).await?;
  profiles.delete(id).await
}

/// Delete every plan and history record of the selected profile
pub async fn clear_profile_data(state: &AppState) -> Result<(), TrackerError> {
  let profile_id = current_profile_id(state).await?;
  PlanRepository::new(state.store.clone(), &profile_id).clear().await?;
  HistoryLog::new(state.store.clone(), &profile_id).clear().await?;
  Ok(())
}
