//! Plan commands

use crate::db::AppState;
use crate::error::TrackerError;
use crate::models::Plan;
use crate::plans::{PlanDraft, PlanRepository};

use super::current_profile_id;

async fn repository(state: &AppState) -> Result<PlanRepository, TrackerError> {
  let profile_id = current_profile_id(state).await?;
  Ok(PlanRepository::new(state.store.clone(), &profile_id))
}

pub async fn get_plans(state: &AppState) -> Result<Vec<Plan>, TrackerError> {
  repository(state).await?.list().await
}

pub async fn get_plan(state: &AppState, id: &str) -> Result<Plan, TrackerError> {
  repository(state).await?.get(id).await
}

pub async fn create_plan(state: &AppState, draft: PlanDraft) -> Result<Plan, TrackerError> {
  repository(state).await?.create(draft).await
}

pub async fn update_plan(state: &AppState, id: &str, draft: PlanDraft) -> Result<Plan, TrackerError> {
  repository(state).await?.update(id, draft).await
}

pub async fn delete_plan(state: &AppState, id: &str) -> Result<bool, TrackerError> {
  repository(state).await?.delete(id).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::commands::fixtures::state_with_profile;
  use crate::commands::profile::create_profile;
  use crate::plans::ExerciseDraft;

  fn draft(name: &str) -> PlanDraft {
    PlanDraft::new(name, vec![ExerciseDraft::new("Squat", Some(5))])
  }

  #[tokio::test]
  async fn test_plan_crud() {
    let (state, _) = state_with_profile().await;
    let plan = create_plan(&state, draft("Legs")).await.unwrap();
    assert_eq!(get_plan(&state, &plan.id).await.unwrap().name, "Legs");

    update_plan(&state, &plan.id, draft("Legs B")).await.unwrap();
    assert_eq!(get_plans(&state).await.unwrap()[0].name, "Legs B");

    assert!(delete_plan(&state, &plan.id).await.unwrap());
    assert!(get_plans(&state).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_plans_are_per_profile() {
    let (state, _) = state_with_profile().await;
    create_plan(&state, draft("Mine")).await.unwrap();

    create_profile(&state, "Other", true).await.unwrap();
    assert!(get_plans(&state).await.unwrap().is_empty());
  }
}
