//! Next-session progression hints
//!
//! Looks at one exercise from one logged workout and suggests what to do
//! next time:
//! - top set hit 12+ reps: add weight
//! - top set under 6 reps: hold the weight, build reps toward 8
//! - otherwise: no suggestion
//!
//! The "top set" is the first set carrying the heaviest weight.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{HistoryRecord, LoggedSet};

// ---------------------------------------------------------------------------
/// Thresholds
// ---------------------------------------------------------------------------

/// Weight added when the top set was easy
pub const WEIGHT_INCREMENT: f64 = 2.5;
/// Reps at or above this on the top set earn a weight increase
pub const HIGH_REP_THRESHOLD: f64 = 12.0;
/// Reps below this on the top set call for rep work at the same weight
pub const LOW_REP_THRESHOLD: f64 = 6.0;
pub const TARGET_REPS: u32 = 8;

// ---------------------------------------------------------------------------
/// Recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recommendation {
    /// Top set was easy: move up
    IncreaseWeight { exercise: String, next_weight: f64 },
    /// Top set was a grind: consolidate at this weight
    FocusOnForm { exercise: String, target_reps: u32 },
}

impl Recommendation {
    pub fn exercise(&self) -> &str {
        match self {
            Self::IncreaseWeight { exercise, .. } | Self::FocusOnForm { exercise, .. } => exercise,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncreaseWeight { next_weight, .. } => {
                write!(f, "Strong! Try {}kg next time.", next_weight)
            }
            Self::FocusOnForm { target_reps, .. } => {
                write!(f, "Focus on form and build to {} reps.", target_reps)
            }
        }
    }
}

/// First set holding the heaviest weight. Weights are compared against a
/// floor of zero, so a list with only negative weights has no top set.
pub fn top_set(sets: &[LoggedSet]) -> Option<&LoggedSet> {
    let max_weight = sets.iter().map(|s| s.weight).fold(0.0_f64, f64::max);
    sets.iter().find(|s| s.weight == max_weight)
}

/// Suggestion for the next session of `exercise_name`, based on `sets` from
/// a single logged workout
pub fn recommendation(exercise_name: &str, sets: &[LoggedSet]) -> Option<Recommendation> {
    let top = top_set(sets)?;

    if top.reps >= HIGH_REP_THRESHOLD {
        Some(Recommendation::IncreaseWeight {
            exercise: exercise_name.to_string(),
            next_weight: top.weight + WEIGHT_INCREMENT,
        })
    } else if top.reps < LOW_REP_THRESHOLD {
        Some(Recommendation::FocusOnForm {
            exercise: exercise_name.to_string(),
            target_reps: TARGET_REPS,
        })
    } else {
        None
    }
}

/// Recommendations for every exercise of a record, in record order
pub fn record_recommendations(record: &HistoryRecord) -> Vec<Recommendation> {
    record
        .exercises
        .iter()
        .filter_map(|e| recommendation(&e.name, &e.sets))
        .collect()
}
