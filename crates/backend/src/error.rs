//! Pipeline error type.
//!
//! Every stage error converts into [`PipelineError`]; the `run_*` entry
//! points fold it into a failure [`GenerationOutcome`](docsmith_core::GenerationOutcome).

use llm::{LlmError, RecoveryError};
use render::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  /// Rejected before any generative call
  #[error("Nothing to process: {0}")]
  EmptyInput(&'static str),
  /// The model reply could not be turned into the expected structure
  #[error("{0}")]
  Recovery(#[from] RecoveryError),
  /// The recovered structure could not be rendered
  #[error("Render error: {0}")]
  Render(#[from] RenderError),
  #[error("Error using the LLM service: {0}")]
  Llm(#[from] LlmError),
}

impl PipelineError {
  pub fn is_empty_input(&self) -> bool {
    matches!(self, Self::EmptyInput(_))
  }
}
