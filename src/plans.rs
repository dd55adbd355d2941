//! Workout plan repository and plan-draft validation

use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::error::TrackerError;
use crate::models::plan::FALLBACK_DEFAULT_SETS;
use crate::models::{new_id, ExerciseTemplate, Plan};
use crate::store::{keys, load_json, save_json, KeyValueStore};

/// ---------------------------------------------------------------------------
/// Drafts: unvalidated editor input
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDraft {
  pub name: String,
  pub default_sets: Option<u32>,
}

impl ExerciseDraft {
  pub fn new(name: impl Into<String>, default_sets: Option<u32>) -> Self {
    Self {
      name: name.into(),
      default_sets,
    }
  }
}

/// `"Bench Press"` or `"Bench Press:4"`
impl FromStr for ExerciseDraft {
  type Err = TrackerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.rsplit_once(':') {
      Some((name, sets)) => {
        let sets = sets.trim().parse::<u32>().map_err(|_| {
          TrackerError::MalformedInput(format!("invalid set count in '{}'", s))
        })?;
        Ok(Self::new(name.trim(), Some(sets)))
      }
      None => Ok(Self::new(s.trim(), None)),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
  pub name: String,
  pub exercises: Vec<ExerciseDraft>,
}

impl PlanDraft {
  pub fn new(name: impl Into<String>, exercises: Vec<ExerciseDraft>) -> Self {
    Self {
      name: name.into(),
      exercises,
    }
  }

  /// Validate into a plan. Blank exercise names are skipped and a missing or
  /// zero set count becomes the fallback of 3.
  pub fn into_plan(self, id: Option<String>, now: DateTime<Utc>) -> Result<Plan, TrackerError> {
    let name = self.name.trim().to_string();
    if name.is_empty() {
      return Err(TrackerError::MalformedInput("plan name is required".into()));
    }

    let exercises: Vec<ExerciseTemplate> = self
      .exercises
      .into_iter()
      .filter(|e| !e.name.trim().is_empty())
      .map(|e| ExerciseTemplate {
        id: new_id(),
        name: e.name.trim().to_string(),
        default_sets: e
          .default_sets
          .filter(|n| *n > 0)
          .unwrap_or(FALLBACK_DEFAULT_SETS),
      })
      .collect();

    if exercises.is_empty() {
      return Err(TrackerError::MalformedInput(
        "a plan needs at least one exercise".into(),
      ));
    }

    Ok(Plan {
      id: id.unwrap_or_else(new_id),
      name,
      exercises,
      created_at: now,
    })
  }
}

/// ---------------------------------------------------------------------------
/// Repository
/// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PlanRepository {
  store: Arc<dyn KeyValueStore>,
  key: String,
}

impl PlanRepository {
  pub fn new(store: Arc<dyn KeyValueStore>, profile_id: &str) -> Self {
    Self {
      store,
      key: keys::plans(profile_id),
    }
  }

  pub async fn list(&self) -> Result<Vec<Plan>, TrackerError> {
    Ok(load_json(self.store.as_ref(), &self.key).await?.unwrap_or_default())
  }

  pub async fn get(&self, id: &str) -> Result<Plan, TrackerError> {
    self
      .list()
      .await?
      .into_iter()
      .find(|p| p.id == id)
      .ok_or_else(|| TrackerError::not_found("Plan", id))
  }

  pub async fn create(&self, draft: PlanDraft) -> Result<Plan, TrackerError> {
    let plan = draft.into_plan(None, Utc::now())?;
    let mut plans = self.list().await?;
    plans.push(plan.clone());
    self.save(&plans).await?;
    info!(plan_id = %plan.id, name = %plan.name, "created plan");
    Ok(plan)
  }

  /// Replace the plan with `id`. Active sessions hold copies, so they are
  /// unaffected.
  pub async fn update(&self, id: &str, draft: PlanDraft) -> Result<Plan, TrackerError> {
    let mut plans = self.list().await?;
    let slot = plans
      .iter_mut()
      .find(|p| p.id == id)
      .ok_or_else(|| TrackerError::not_found("Plan", id))?;
    let plan = draft.into_plan(Some(id.to_string()), Utc::now())?;
    *slot = plan.clone();
    self.save(&plans).await?;
    info!(plan_id = id, "updated plan");
    Ok(plan)
  }

  /// Returns false when no plan had that id
  pub async fn delete(&self, id: &str) -> Result<bool, TrackerError> {
    let mut plans = self.list().await?;
    let before = plans.len();
    plans.retain(|p| p.id != id);
    if plans.len() == before {
      return Ok(false);
    }
    self.save(&plans).await?;
    info!(plan_id = id, "deleted plan");
    Ok(true)
  }

  pub async fn clear(&self) -> Result<(), TrackerError> {
    self.save(&[]).await
  }

  async fn save(&self, plans: &[Plan]) -> Result<(), TrackerError> {
    save_json(self.store.as_ref(), &self.key, plans).await?;
    Ok(())
  }
}
