use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Set count used when a plan entry or session exercise has none
pub const FALLBACK_DEFAULT_SETS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
  pub id: String,
  pub name: String,
  pub exercises: Vec<ExerciseTemplate>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseTemplate {
  pub id: String,
  pub name: String,
  pub default_sets: u32,
}

impl Plan {
  /// Up to three exercise names, with an ellipsis when the plan has more
  pub fn preview(&self) -> String {
    let names: Vec<&str> = self.exercises.iter().take(3).map(|e| e.name.as_str()).collect();
    let mut preview = names.join(", ");
    if self.exercises.len() > 3 {
      preview.push_str("...");
    }
    preview
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn template(name: &str) -> ExerciseTemplate {
    ExerciseTemplate {
      id: name.to_lowercase(),
      name: name.to_string(),
      default_sets: 3,
    }
  }

  #[test]
  fn test_preview_truncates_after_three() {
    let plan = Plan {
      id: "p".into(),
      name: "Push".into(),
      exercises: vec![template("Bench"), template("Dips"), template("Press"), template("Flyes")],
      created_at: Utc::now(),
    };
    assert_eq!(plan.preview(), "Bench, Dips, Press...");
  }

  #[test]
  fn test_plan_json_uses_camel_case() {
    let json = serde_json::to_value(template("Squat")).unwrap();
    assert_eq!(json["defaultSets"], 3);
  }
}
