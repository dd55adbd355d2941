use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::history::{HistoryRecord, LoggedSet};
use super::new_id;
use super::plan::{Plan, FALLBACK_DEFAULT_SETS};

/// ---------------------------------------------------------------------------
/// Set Entry: one editable row of an in-progress exercise
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
  #[serde(default, deserialize_with = "deserialize_lenient_number")]
  pub weight: Option<f64>,
  #[serde(default, deserialize_with = "deserialize_lenient_number")]
  pub reps: Option<f64>,
  #[serde(default)]
  pub completed: bool,
}

impl SetEntry {
  pub fn new(weight: Option<f64>, reps: Option<f64>) -> Self {
    Self {
      weight,
      reps,
      completed: false,
    }
  }

  /// Parse a raw input field from its leading number, so `"80kg"` reads as
  /// 80. Text without a leading number is treated as absent.
  pub fn parse_field(raw: &str) -> Option<f64> {
    let number = numeric_prefix(raw.trim());
    if number.is_empty() {
      return None;
    }
    number.parse::<f64>().ok().filter(|v| v.is_finite())
  }

  /// Whether this row carries enough data to be logged
  pub fn has_value(&self) -> bool {
    self.weight.is_some() || self.reps.is_some()
  }

  /// Logged form of this row, or None when both fields are empty
  pub fn to_logged(&self) -> Option<LoggedSet> {
    if !self.has_value() {
      return None;
    }
    Some(LoggedSet {
      weight: self.weight.unwrap_or(0.0),
      reps: self.reps.unwrap_or(0.0),
    })
  }
}

/// Longest prefix of `s` shaped like a decimal number (sign, digits, fraction,
/// exponent). Empty when `s` does not start with one.
fn numeric_prefix(s: &str) -> &str {
  let bytes = s.as_bytes();
  let is_digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

  let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
  let int_start = end;
  while is_digit(end) {
    end += 1;
  }
  let mut digits = end - int_start;

  if bytes.get(end) == Some(&b'.') {
    let mut frac_end = end + 1;
    while is_digit(frac_end) {
      frac_end += 1;
    }
    let frac_digits = frac_end - (end + 1);
    if digits + frac_digits > 0 {
      digits += frac_digits;
      end = frac_end;
    }
  }
  if digits == 0 {
    return "";
  }

  if matches!(bytes.get(end), Some(b'e' | b'E')) {
    let mut exp_end = end + 1;
    if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
      exp_end += 1;
    }
    let exp_start = exp_end;
    while is_digit(exp_end) {
      exp_end += 1;
    }
    if exp_end > exp_start {
      end = exp_end;
    }
  }
  &s[..end]
}

impl From<&LoggedSet> for SetEntry {
  fn from(set: &LoggedSet) -> Self {
    Self::new(Some(set.weight), Some(set.reps))
  }
}

/// Snapshots written by older front ends hold weight/reps as strings
/// (`""` for an untouched field), so accept numbers, numeric text, and null.
fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Number(f64),
    Text(String),
  }

  let raw: Option<Raw> = Option::deserialize(deserializer)?;
  Ok(match raw {
    Some(Raw::Number(n)) => Some(n),
    Some(Raw::Text(s)) => SetEntry::parse_field(&s),
    None => None,
  })
}

/// ---------------------------------------------------------------------------
/// Session Exercise
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExercise {
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_sets: Option<u32>,
  /// Concrete rows; absent until the exercise is first edited
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sets: Option<Vec<SetEntry>>,
  /// Values from a replayed history record
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prefill_sets: Option<Vec<LoggedSet>>,
}

impl SessionExercise {
  pub fn new(name: impl Into<String>, sets: Vec<SetEntry>) -> Self {
    Self {
      id: new_id(),
      name: name.into(),
      default_sets: None,
      sets: Some(sets),
      prefill_sets: None,
    }
  }

  /// The rows a user sees: edited sets, else replayed values, else empty rows
  pub fn effective_sets(&self) -> Vec<SetEntry> {
    if let Some(sets) = &self.sets {
      return sets.clone();
    }
    if let Some(prefill) = &self.prefill_sets {
      return prefill.iter().map(SetEntry::from).collect();
    }
    let count = self
      .default_sets
      .filter(|n| *n > 0)
      .unwrap_or(FALLBACK_DEFAULT_SETS);
    vec![SetEntry::default(); count as usize]
  }

  /// Materialise the effective rows so they can be edited in place
  pub fn sets_mut(&mut self) -> &mut Vec<SetEntry> {
    if self.sets.is_none() {
      self.sets = Some(self.effective_sets());
    }
    self.sets.get_or_insert_with(Vec::new)
  }
}

/// ---------------------------------------------------------------------------
/// Active Session
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
  pub plan_id: String,
  pub plan_name: String,
  pub start_time: DateTime<Utc>,
  pub exercises: Vec<SessionExercise>,
}

/// Plan id recorded when replaying a record that has none
pub const REDO_PLAN_ID: &str = "redo";

impl ActiveSession {
  /// Fresh session with one empty exercise per plan template
  pub fn from_plan(plan: &Plan, now: DateTime<Utc>) -> Self {
    let exercises = plan
      .exercises
      .iter()
      .map(|template| SessionExercise {
        id: template.id.clone(),
        name: template.name.clone(),
        default_sets: Some(template.default_sets),
        sets: None,
        prefill_sets: None,
      })
      .collect();

    Self {
      plan_id: plan.id.clone(),
      plan_name: plan.name.clone(),
      start_time: now,
      exercises,
    }
  }

  /// Session pre-filled with the sets performed in `record`
  pub fn from_history(record: &HistoryRecord, now: DateTime<Utc>) -> Self {
    let exercises = record
      .exercises
      .iter()
      .map(|exercise| SessionExercise {
        id: new_id(),
        name: exercise.name.clone(),
        default_sets: Some(exercise.sets.len() as u32),
        sets: None,
        prefill_sets: Some(exercise.sets.clone()),
      })
      .collect();

    let plan_id = record
      .plan_id
      .clone()
      .filter(|id| !id.is_empty())
      .unwrap_or_else(|| REDO_PLAN_ID.to_string());

    Self {
      plan_id,
      plan_name: record.plan_name.clone(),
      start_time: now,
      exercises,
    }
  }

  pub fn exercise(&self, exercise_id: &str) -> Option<&SessionExercise> {
    self.exercises.iter().find(|e| e.id == exercise_id)
  }

  pub fn exercise_mut(&mut self, exercise_id: &str) -> Option<&mut SessionExercise> {
    self.exercises.iter_mut().find(|e| e.id == exercise_id)
  }

  /// Completed rows across all exercises
  pub fn completed_sets(&self) -> usize {
    self
      .exercises
      .iter()
      .map(|e| e.effective_sets().iter().filter(|s| s.completed).count())
      .sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::plan::ExerciseTemplate;
  use crate::models::LoggedExercise;
  use chrono::TimeZone;

  fn plan() -> Plan {
    Plan {
      id: "plan-1".into(),
      name: "Legs".into(),
      exercises: vec![
        ExerciseTemplate {
          id: "ex-squat".into(),
          name: "Squat".into(),
          default_sets: 4,
        },
        ExerciseTemplate {
          id: "ex-lunge".into(),
          name: "Lunge".into(),
          default_sets: 2,
        },
      ],
      created_at: Utc::now(),
    }
  }

  #[test]
  fn test_parse_field() {
    assert_eq!(SetEntry::parse_field("100"), Some(100.0));
    assert_eq!(SetEntry::parse_field(" 62.5 "), Some(62.5));
    assert_eq!(SetEntry::parse_field(""), None);
    assert_eq!(SetEntry::parse_field("heavy"), None);
    assert_eq!(SetEntry::parse_field("NaN"), None);
  }

  #[test]
  fn test_parse_field_reads_leading_number() {
    assert_eq!(SetEntry::parse_field("80kg"), Some(80.0));
    assert_eq!(SetEntry::parse_field("12 reps"), Some(12.0));
    assert_eq!(SetEntry::parse_field("-2.5x"), Some(-2.5));
    assert_eq!(SetEntry::parse_field(".5"), Some(0.5));
    assert_eq!(SetEntry::parse_field("60."), Some(60.0));
    assert_eq!(SetEntry::parse_field("1e2kg"), Some(100.0));
    assert_eq!(SetEntry::parse_field("7e"), Some(7.0));
    assert_eq!(SetEntry::parse_field("kg80"), None);
    assert_eq!(SetEntry::parse_field("-."), None);
    assert_eq!(SetEntry::parse_field("Infinity"), None);
  }

  #[test]
  fn test_legacy_string_with_unit_is_kept() {
    let set: SetEntry = serde_json::from_str(r#"{"weight":"80kg","reps":"8"}"#).unwrap();
    assert_eq!(set.to_logged(), Some(LoggedSet { weight: 80.0, reps: 8.0 }));
  }

  #[test]
  fn test_set_entry_reads_legacy_string_fields() {
    let json = r#"[{"weight":"80","reps":"","completed":true},{"weight":60,"reps":10},{"completed":false}]"#;
    let sets: Vec<SetEntry> = serde_json::from_str(json).unwrap();

    assert_eq!(sets[0], SetEntry { weight: Some(80.0), reps: None, completed: true });
    assert_eq!(sets[1], SetEntry { weight: Some(60.0), reps: Some(10.0), completed: false });
    assert_eq!(sets[2], SetEntry::default());
  }

  #[test]
  fn test_to_logged_defaults_missing_field_to_zero() {
    assert_eq!(
      SetEntry::new(None, Some(12.0)).to_logged(),
      Some(LoggedSet { weight: 0.0, reps: 12.0 })
    );
    assert_eq!(SetEntry::default().to_logged(), None);
  }

  #[test]
  fn test_from_plan_copies_templates_without_rows() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
    let session = ActiveSession::from_plan(&plan(), now);

    assert_eq!(session.plan_id, "plan-1");
    assert_eq!(session.start_time, now);
    assert_eq!(session.exercises.len(), 2);
    assert!(session.exercises[0].sets.is_none());
    assert_eq!(session.exercises[0].effective_sets().len(), 4);
    assert_eq!(session.exercises[1].effective_sets().len(), 2);
  }

  #[test]
  fn test_effective_sets_falls_back_to_three_rows() {
    let exercise = SessionExercise {
      id: "x".into(),
      name: "Curl".into(),
      default_sets: Some(0),
      sets: None,
      prefill_sets: None,
    };
    assert_eq!(exercise.effective_sets().len(), 3);
  }

  #[test]
  fn test_from_history_prefills_previous_sets() {
    let record = HistoryRecord {
      id: "h1".into(),
      plan_id: None,
      plan_name: "Old Plan".into(),
      date: Utc::now(),
      duration: 40,
      exercises: vec![LoggedExercise {
        name: "Row".into(),
        sets: vec![
          LoggedSet { weight: 50.0, reps: 10.0 },
          LoggedSet { weight: 55.0, reps: 8.0 },
        ],
      }],
    };

    let session = ActiveSession::from_history(&record, Utc::now());
    assert_eq!(session.plan_id, REDO_PLAN_ID);
    assert_eq!(session.plan_name, "Old Plan");

    let rows = session.exercises[0].effective_sets();
    assert_eq!(session.exercises[0].default_sets, Some(2));
    assert_eq!(rows[1], SetEntry::new(Some(55.0), Some(8.0)));
    assert!(rows.iter().all(|r| !r.completed));
  }

  #[test]
  fn test_sets_mut_materialises_default_rows() {
    let mut session = ActiveSession::from_plan(&plan(), Utc::now());
    let squat = session.exercise_mut("ex-squat").unwrap();
    squat.sets_mut().push(SetEntry::default());
    assert_eq!(squat.sets.as_ref().map(Vec::len), Some(5));
  }

  #[test]
  fn test_snapshot_json_roundtrip_preserves_start_time() {
    let now = Utc.with_ymd_and_hms(2024, 5, 3, 7, 30, 0).unwrap();
    let session = ActiveSession::from_plan(&plan(), now);
    let json = serde_json::to_string(&session).unwrap();
    assert!(json.contains("\"startTime\":\"2024-05-03T07:30:00Z\""));

    let restored: ActiveSession = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, session);
  }
}
