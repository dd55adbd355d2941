pub mod history;
pub mod plan;
pub mod profile;
pub mod session;

pub use history::{HistoryRecord, LoggedExercise, LoggedSet};
pub use plan::{ExerciseTemplate, Plan};
pub use profile::Profile;
pub use session::{ActiveSession, SessionExercise, SetEntry};

/// Fresh unique id for profiles, plans, exercises and history records
pub fn new_id() -> String {
  uuid::Uuid::new_v4().to_string()
}
