use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
  Success,
  Failure,
}

/// Result value handed back across a pipeline boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
  pub outcome: Outcome,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub artifact_path: Option<PathBuf>,
}

impl GenerationOutcome {
  pub fn success(message: impl Into<String>, artifact_path: PathBuf) -> Self {
    Self {
      outcome: Outcome::Success,
      message: message.into(),
      artifact_path: Some(artifact_path),
    }
  }

  pub fn failure(message: impl Into<String>) -> Self {
    Self {
      outcome: Outcome::Failure,
      message: message.into(),
      artifact_path: None,
    }
  }

  pub fn is_success(&self) -> bool {
    self.outcome == Outcome::Success
  }
}
