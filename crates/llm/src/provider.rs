use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::{InferenceRequest, InferenceResponse, LlmError};

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// A generative model backend
///
/// Implementations own their transport and timeout handling. Callers treat
/// every failure as final for that call; retries are not the provider's job.
#[async_trait]
pub trait LlmProvider: Send + Sync + DynClone {
  /// The name of this provider (for logging)
  fn name(&self) -> &str;

  /// Whether the provider can serve requests (CLI on PATH, key configured, ...)
  fn is_available(&self) -> bool;

  async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse>;
}

dyn_clone::clone_trait_object!(LlmProvider);
