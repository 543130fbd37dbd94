//! Generative model access for docsmith
//!
//! Providers implement [`LlmProvider`]. [`recovery`] turns free-form model
//! replies into typed values, with one repair round-trip when the first reply
//! does not parse. [`prompts`] holds the prompt builders and output schemas.

pub mod prompts;
mod provider;
pub mod recovery;

#[cfg(feature = "claude")]
mod claude;

#[cfg(feature = "claude")]
pub use claude::ClaudeProvider;
pub use provider::{LlmProvider, Result};
pub use recovery::{RecoveryError, extract_json_candidate, generate_structured, recover};

/// Create the default LLM provider based on available features
///
/// Returns the first available provider in priority order:
/// 1. Claude CLI (if `claude` feature is enabled)
pub fn create_provider() -> Result<Box<dyn LlmProvider>> {
  #[cfg(feature = "claude")]
  {
    let provider = claude::ClaudeProvider::new();
    if provider.is_available() {
      return Ok(Box::new(provider));
    }
    Err(LlmError::ClaudeNotFound)
  }

  #[cfg(not(feature = "claude"))]
  {
    Err(LlmError::NoProviderAvailable)
  }
}

/// Request for LLM inference
#[derive(Debug, Clone)]
pub struct InferenceRequest {
  pub prompt: String,
  pub system_prompt: Option<String>,
  /// Model to use (default: haiku)
  pub model: String,
  pub timeout_secs: u64,
  /// JSON schema the reply should follow, if any
  pub json_schema: Option<String>,
}

impl Default for InferenceRequest {
  fn default() -> Self {
    Self {
      prompt: String::new(),
      system_prompt: None,
      model: "haiku".to_string(),
      timeout_secs: 120,
      json_schema: None,
    }
  }
}

impl InferenceRequest {
  pub fn new(prompt: impl Into<String>) -> Self {
    Self {
      prompt: prompt.into(),
      ..Default::default()
    }
  }

  pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
    self.json_schema = Some(schema.into());
    self
  }

  pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
    self.system_prompt = Some(system.into());
    self
  }

  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model = model.into();
    self
  }

  pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
    self.timeout_secs = timeout_secs;
    self
  }

  /// Same model and timeout, different prompt, no system prompt or schema
  pub fn follow_up(&self, prompt: impl Into<String>) -> Self {
    Self {
      prompt: prompt.into(),
      system_prompt: None,
      model: self.model.clone(),
      timeout_secs: self.timeout_secs,
      json_schema: None,
    }
  }

  /// System prompt and prompt as one text
  pub fn full_prompt(&self) -> String {
    match &self.system_prompt {
      Some(system) => format!("{}\n\n{}", system, self.prompt),
      None => self.prompt.clone(),
    }
  }
}

/// Response from LLM inference
#[derive(Debug, Clone, Default)]
pub struct InferenceResponse {
  pub text: String,
  pub input_tokens: u32,
  pub output_tokens: u32,
  /// Cost in USD (if available)
  pub cost_usd: Option<f64>,
  pub duration_ms: u64,
}

impl InferenceResponse {
  pub fn from_text(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      ..Default::default()
    }
  }
}

/// Errors that can occur during LLM inference
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
  #[error("Failed to spawn process: {0}")]
  SpawnFailed(#[from] std::io::Error),
  #[error("process timed out after {0} seconds")]
  Timeout(u64),
  #[error("process exited with non-zero status: {0}")]
  ProcessFailed(i32),
  #[error("Failed to parse JSON response: {0}")]
  ParseError(#[from] serde_json::Error),
  #[error("No assistant message in response")]
  NoResponse,
  #[error("No LLM provider available. Enable a provider feature (e.g., 'claude').")]
  NoProviderAvailable,
  #[cfg(feature = "claude")]
  #[error("Claude executable not found. Ensure 'claude' is in your PATH.")]
  ClaudeNotFound,
  #[cfg(feature = "claude")]
  #[error("Claude returned an error: {0}")]
  ClaudeError(String),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_full_prompt() {
    let request = InferenceRequest::new("Summarize.");
    assert_eq!(request.full_prompt(), "Summarize.");

    let request = request.with_system_prompt("You are terse.");
    assert_eq!(request.full_prompt(), "You are terse.\n\nSummarize.");
  }

  #[test]
  fn test_follow_up_drops_context() {
    let request = InferenceRequest::new("first")
      .with_system_prompt("system")
      .with_schema("{}")
      .with_model("sonnet")
      .with_timeout(30);

    let follow_up = request.follow_up("second");
    assert_eq!(follow_up.prompt, "second");
    assert_eq!(follow_up.model, "sonnet");
    assert_eq!(follow_up.timeout_secs, 30);
    assert!(follow_up.system_prompt.is_none());
    assert!(follow_up.json_schema.is_none());
  }
}
