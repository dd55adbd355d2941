use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::new_id;
use super::session::ActiveSession;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoggedSet {
  #[serde(default)]
  pub weight: f64,
  #[serde(default)]
  pub reps: f64,
}

impl fmt::Display for LoggedSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}kg x {}", self.weight, self.reps)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedExercise {
  pub name: String,
  pub sets: Vec<LoggedSet>,
}

/// A completed workout. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
  pub id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plan_id: Option<String>,
  pub plan_name: String,
  pub date: DateTime<Utc>,
  /// Whole minutes, rounded
  pub duration: i64,
  pub exercises: Vec<LoggedExercise>,
}

impl HistoryRecord {
  /// Build the record for a session finished at `now`.
  ///
  /// Rows with neither weight nor reps are dropped, a missing field on a kept
  /// row becomes 0, and exercises left with no rows are omitted.
  pub fn from_session(session: &ActiveSession, now: DateTime<Utc>) -> Self {
    let exercises = session
      .exercises
      .iter()
      .filter_map(|exercise| {
        let sets: Vec<LoggedSet> = exercise
          .effective_sets()
          .iter()
          .filter_map(|row| row.to_logged())
          .collect();
        if sets.is_empty() {
          None
        } else {
          Some(LoggedExercise {
            name: exercise.name.clone(),
            sets,
          })
        }
      })
      .collect();

    Self {
      id: new_id(),
      plan_id: Some(session.plan_id.clone()),
      plan_name: session.plan_name.clone(),
      date: now,
      duration: duration_minutes(session.start_time, now),
      exercises,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.exercises.is_empty()
  }

  pub fn total_sets(&self) -> usize {
    self.exercises.iter().map(|e| e.sets.len()).sum()
  }
}

/// Elapsed time rounded to whole minutes. Not clamped: a start time after
/// `end` yields a negative value.
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
  let millis = (end - start).num_milliseconds() as f64;
  (millis / 60_000.0).round() as i64
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::session::{SessionExercise, SetEntry};
  use chrono::{Duration, TimeZone};

  fn session_with(exercises: Vec<SessionExercise>) -> ActiveSession {
    ActiveSession {
      plan_id: "plan-1".into(),
      plan_name: "Upper".into(),
      start_time: Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap(),
      exercises,
    }
  }

  #[test]
  fn test_duration_rounds_to_nearest_minute() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
    assert_eq!(duration_minutes(start, start + Duration::seconds(89)), 1);
    assert_eq!(duration_minutes(start, start + Duration::seconds(90)), 2);
    assert_eq!(duration_minutes(start, start + Duration::minutes(45)), 45);
  }

  #[test]
  fn test_duration_is_negative_when_clock_went_backwards() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
    assert_eq!(duration_minutes(start, start - Duration::minutes(10)), -10);
  }

  #[test]
  fn test_from_session_filters_rows_and_exercises() {
    let session = session_with(vec![
      SessionExercise::new(
        "Bench",
        vec![
          SetEntry::new(Some(80.0), Some(8.0)),
          SetEntry::new(None, None),
          SetEntry::new(Some(85.0), None),
        ],
      ),
      SessionExercise::new("Dips", vec![SetEntry::default(), SetEntry::default()]),
    ]);
    let now = session.start_time + Duration::minutes(52);

    let record = HistoryRecord::from_session(&session, now);

    assert_eq!(record.plan_id.as_deref(), Some("plan-1"));
    assert_eq!(record.duration, 52);
    assert_eq!(record.date, now);
    assert_eq!(record.exercises.len(), 1);
    assert_eq!(
      record.exercises[0].sets,
      vec![
        LoggedSet { weight: 80.0, reps: 8.0 },
        LoggedSet { weight: 85.0, reps: 0.0 },
      ]
    );
  }

  #[test]
  fn test_from_session_with_only_empty_rows_is_empty() {
    let session = session_with(vec![SessionExercise::new("Bench", vec![SetEntry::default()])]);
    let record = HistoryRecord::from_session(&session, Utc::now());
    assert!(record.is_empty());
  }

  #[test]
  fn test_logged_set_display() {
    assert_eq!(LoggedSet { weight: 102.5, reps: 5.0 }.to_string(), "102.5kg x 5");
  }
}
