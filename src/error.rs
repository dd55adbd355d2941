use serde::Serialize;

use crate::store::StoreError;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: String },

  #[error("Invalid state: {0}")]
  InvalidState(String),

  #[error("Malformed input: {0}")]
  MalformedInput(String),

  #[error("No profile selected")]
  NoProfileSelected,

  #[error("Storage error: {0}")]
  Store(#[from] StoreError),
}

impl TrackerError {
  pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
    Self::NotFound { kind, id: id.into() }
  }
}

impl Serialize for TrackerError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}
