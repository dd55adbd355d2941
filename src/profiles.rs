//! Local profiles: each one partitions plans, history and the active workout

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::error::TrackerError;
use crate::models::{new_id, Profile};
use crate::store::{keys, load_json, save_json, KeyValueStore};

/// Name given to the profile synthesised by the legacy migration
pub const LEGACY_PROFILE_NAME: &str = "Default User";

pub struct ProfileManager {
  store: Arc<dyn KeyValueStore>,
  profiles: Vec<Profile>,
  current_profile_id: Option<String>,
}

impl ProfileManager {
  pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, TrackerError> {
    let profiles = load_json(store.as_ref(), keys::PROFILES)
      .await?
      .unwrap_or_default();
    let current_profile_id = load_json(store.as_ref(), keys::CURRENT_PROFILE).await?;
    Ok(Self {
      store,
      profiles,
      current_profile_id,
    })
  }

  pub fn profiles(&self) -> &[Profile] {
    &self.profiles
  }

  pub fn get(&self, id: &str) -> Option<&Profile> {
    self.profiles.iter().find(|p| p.id == id)
  }

  /// The selected profile, if it still exists
  pub fn current_profile(&self) -> Option<&Profile> {
    self.current_profile_id.as_deref().and_then(|id| self.get(id))
  }

  pub fn current_profile_id(&self) -> Option<&str> {
    self.current_profile().map(|p| p.id.as_str())
  }

  pub async fn create(&mut self, name: &str) -> Result<Profile, TrackerError> {
    let name = name.trim();
    if name.is_empty() {
      return Err(TrackerError::MalformedInput("profile name is required".into()));
    }
    let profile = Profile {
      id: new_id(),
      name: name.to_string(),
      created_at: Utc::now(),
    };
    self.insert(profile.clone()).await?;
    info!(profile_id = %profile.id, name = %profile.name, "created profile");
    Ok(profile)
  }

  pub async fn select(&mut self, id: &str) -> Result<&Profile, TrackerError> {
    let index = self
      .profiles
      .iter()
      .position(|p| p.id == id)
      .ok_or_else(|| TrackerError::not_found("Profile", id))?;
    save_json(self.store.as_ref(), keys::CURRENT_PROFILE, id).await?;
    self.current_profile_id = Some(id.to_string());
    info!(profile_id = id, "selected profile");
    Ok(&self.profiles[index])
  }

  /// Remove the profile and every document scoped to it. Clears the
  /// selection when the deleted profile was selected.
  ///
  /// Scoped documents go first: the profile stays listed until its data is
  /// gone, so a failed delete can be retried.
  pub async fn delete(&mut self, id: &str) -> Result<bool, TrackerError> {
    if self.get(id).is_none() {
      return Ok(false);
    }

    for key in [keys::plans(id), keys::history(id), keys::active_workout(id)] {
      self.store.remove(&key).await?;
    }

    let remaining: Vec<Profile> = self.profiles.iter().filter(|p| p.id != id).cloned().collect();
    save_json(self.store.as_ref(), keys::PROFILES, &remaining).await?;
    self.profiles = remaining;

    if self.current_profile_id.as_deref() == Some(id) {
      self.store.remove(keys::CURRENT_PROFILE).await?;
      self.current_profile_id = None;
    }
    info!(profile_id = id, "deleted profile and its data");
    Ok(true)
  }

  /// Move pre-profile data under a synthesised default profile.
  ///
  /// Runs only when a legacy plan list exists and no profiles do, so calling
  /// it again is a no-op. The profile list is written after the scoped copies
  /// and the selection, so an interrupted run is redone in full on the next
  /// call. Returns whether anything was migrated.
  pub async fn migrate_legacy_data(&mut self) -> Result<bool, TrackerError> {
    if !self.profiles.is_empty() {
      return Ok(false);
    }
    let Some(legacy_plans) = self.store.get(keys::LEGACY_PLANS).await? else {
      return Ok(false);
    };

    info!("migrating legacy data into a default profile");
    let profile = Profile {
      id: new_id(),
      name: LEGACY_PROFILE_NAME.to_string(),
      created_at: Utc::now(),
    };

    self.store.set(&keys::plans(&profile.id), &legacy_plans).await?;
    if let Some(legacy_history) = self.store.get(keys::LEGACY_HISTORY).await? {
      self.store.set(&keys::history(&profile.id), &legacy_history).await?;
    }

    save_json(self.store.as_ref(), keys::CURRENT_PROFILE, profile.id.as_str()).await?;
    self.insert(profile.clone()).await?;
    self.current_profile_id = Some(profile.id.clone());

    self.store.remove(keys::LEGACY_PLANS).await?;
    self.store.remove(keys::LEGACY_HISTORY).await?;
    info!(profile_id = %profile.id, "legacy data migrated");
    Ok(true)
  }

  /// Save the list with `profile` appended, then adopt it
  async fn insert(&mut self, profile: Profile) -> Result<(), TrackerError> {
    let mut next = self.profiles.clone();
    next.push(profile);
    save_json(self.store.as_ref(), keys::PROFILES, &next).await?;
    self.profiles = next;
    Ok(())
  }
}
