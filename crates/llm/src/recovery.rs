//! Structured output recovery
//!
//! Model replies are free text that usually contains a JSON object somewhere.
//! Recovery pulls out the most likely object, parses it strictly into the
//! target type, and on failure spends exactly one more generative call asking
//! the model to fix the malformed candidate. No request ever makes more than
//! two calls.

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{InferenceRequest, LlmError, LlmProvider, prompts::build_repair_prompt};

/// Characters of the original reply kept in a terminal diagnostic
pub const PREVIEW_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
  #[error("Generation failed: {0}")]
  Generation(#[from] LlmError),
  #[error("Failed to parse model output as JSON: {first_error}; repair failed: {repair_error}\nReceived (start): {preview}...")]
  Unrecoverable {
    /// Prefix of the original reply
    preview: String,
    first_error: String,
    repair_error: String,
  },
}

/// First balanced `{...}` object in `text`
///
/// Quotes toggle string mode unless escaped, and a backslash escapes the
/// following character. Braces inside strings are not counted.
pub fn extract_balanced(text: &str) -> Option<&str> {
  let start = text.find('{')?;

  let mut depth = 0usize;
  let mut in_string = false;
  let mut escape = false;

  for (offset, ch) in text[start..].char_indices() {
    if ch == '"' && !escape {
      in_string = !in_string;
    }
    if ch == '\\' && !escape {
      escape = true;
      continue;
    }
    escape = false;

    if in_string {
      continue;
    }
    match ch {
      '{' => depth += 1,
      '}' => {
        depth -= 1;
        if depth == 0 {
          let end = start + offset + ch.len_utf8();
          return Some(&text[start..end]);
        }
      }
      _ => {}
    }
  }

  None
}

/// Widest span from the first `{` to the last `}` after it
pub fn extract_greedy(text: &str) -> Option<&str> {
  let start = text.find('{')?;
  let end = text.rfind('}')?;
  (end > start).then(|| &text[start..=end])
}

/// The text most likely to hold the reply's JSON object
///
/// Balanced extraction first, then the greedy span, then the trimmed reply.
pub fn extract_json_candidate(text: &str) -> &str {
  let text = text.trim();
  extract_balanced(text).or_else(|| extract_greedy(text)).unwrap_or(text)
}

/// Recover a `T` from a model reply, asking `provider` once for a repair
///
/// The repair request reuses the model and timeout of `request` but carries
/// neither its system prompt nor its schema.
pub async fn recover<T: DeserializeOwned>(
  provider: &dyn LlmProvider,
  request: &InferenceRequest,
  raw: &str,
) -> Result<T, RecoveryError> {
  let candidate = extract_json_candidate(raw);
  debug!(raw_len = raw.len(), candidate_len = candidate.len(), "Extracted JSON candidate");

  let first_error = match serde_json::from_str::<T>(candidate) {
    Ok(value) => return Ok(value),
    Err(e) => e,
  };

  warn!(err = %first_error, provider = provider.name(), "Model output did not parse, requesting repair");

  let repair = request.follow_up(build_repair_prompt(candidate));
  let repair_error = match provider.infer(repair).await {
    Ok(response) => match serde_json::from_str::<T>(extract_json_candidate(&response.text)) {
      Ok(value) => {
        info!("Model output recovered after repair");
        return Ok(value);
      }
      Err(e) => e.to_string(),
    },
    Err(e) => format!("repair call failed: {}", e),
  };

  warn!(first_error = %first_error, repair_error = %repair_error, "Structured output unrecoverable");
  Err(RecoveryError::Unrecoverable {
    preview: raw.chars().take(PREVIEW_CHARS).collect(),
    first_error: first_error.to_string(),
    repair_error,
  })
}

/// Run `request` and recover a `T` from the reply
pub async fn generate_structured<T: DeserializeOwned>(
  provider: &dyn LlmProvider,
  request: InferenceRequest,
) -> Result<T, RecoveryError> {
  let response = provider.infer(request.clone()).await?;
  recover(provider, &request, &response.text).await
}

#[cfg(test)]
mod tests {
  use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
  };

  use async_trait::async_trait;
  use pretty_assertions::assert_eq;
  use serde::Deserialize;

  use super::*;
  use crate::{InferenceResponse, Result};

  /// Replies from a fixed script; `None` entries fail the call
  #[derive(Clone, Default)]
  struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<Option<String>>>>,
    requests: Arc<Mutex<Vec<InferenceRequest>>>,
  }

  impl ScriptedProvider {
    fn new(replies: &[Option<&str>]) -> Self {
      Self {
        replies: Arc::new(Mutex::new(replies.iter().map(|r| r.map(String::from)).collect())),
        ..Default::default()
      }
    }

    fn calls(&self) -> usize {
      self.requests.lock().unwrap().len()
    }

    fn request(&self, i: usize) -> InferenceRequest {
      self.requests.lock().unwrap()[i].clone()
    }
  }

  #[async_trait]
  impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
      "scripted"
    }

    fn is_available(&self) -> bool {
      true
    }

    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse> {
      self.requests.lock().unwrap().push(request);
      match self.replies.lock().unwrap().pop_front().flatten() {
        Some(text) => Ok(InferenceResponse::from_text(text)),
        None => Err(LlmError::NoResponse),
      }
    }
  }

  #[derive(Debug, Deserialize, PartialEq)]
  struct Titled {
    title: String,
  }

  // ============================================================================
  // EXTRACTION TESTS
  // ============================================================================

  #[test]
  fn test_balanced_ignores_braces_in_strings() {
    let text = r#"noise {"a": "va{l}ue"} trailing {"b":1}"#;
    assert_eq!(extract_balanced(text), Some(r#"{"a": "va{l}ue"}"#));
  }

  #[test]
  fn test_balanced_handles_escaped_quotes() {
    let text = r#"x {"a": "say \"}\" ok", "b": {"c": 1}} y"#;
    assert_eq!(extract_balanced(text), Some(r#"{"a": "say \"}\" ok", "b": {"c": 1}}"#));
  }

  #[test]
  fn test_balanced_returns_first_not_widest() {
    assert_eq!(extract_balanced("{} {\"a\": 1}"), Some("{}"));
  }

  #[test]
  fn test_balanced_none_when_unclosed() {
    assert_eq!(extract_balanced(r#"{"a": {"b": 1}"#), None);
    assert_eq!(extract_balanced("no braces"), None);
  }

  #[test]
  fn test_greedy_spans_first_to_last() {
    assert_eq!(extract_greedy("a {x} b {y} c"), Some("{x} b {y}"));
    assert_eq!(extract_greedy("} only {"), None);
  }

  #[test]
  fn test_candidate_fallbacks() {
    assert_eq!(extract_json_candidate("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    // unbalanced: balanced extraction fails, greedy span from first { to last }
    assert_eq!(extract_json_candidate("x {\"a\": {\"b\": 1} y"), "{\"a\": {\"b\": 1}");
    assert_eq!(extract_json_candidate("  no json here  "), "no json here");
  }

  // ============================================================================
  // RECOVERY TESTS
  // ============================================================================

  #[tokio::test]
  async fn test_parses_without_repair() {
    let provider = ScriptedProvider::new(&[Some(r#"Here you go: {"title": "Doc"} thanks"#)]);

    let value: Titled = generate_structured(&provider, InferenceRequest::new("go")).await.unwrap();
    assert_eq!(value.title, "Doc");
    assert_eq!(provider.calls(), 1);
  }

  #[tokio::test]
  async fn test_truncated_reply_repaired_in_two_calls() {
    let provider = ScriptedProvider::new(&[Some(r#"{"title": "Doc"#), Some(r#"{"title": "Doc"}"#)]);
    let request = InferenceRequest::new("go")
      .with_system_prompt("system")
      .with_schema("{}")
      .with_model("sonnet");

    let value: Titled = generate_structured(&provider, request).await.unwrap();
    assert_eq!(value, Titled { title: "Doc".to_string() });
    assert_eq!(provider.calls(), 2);

    let repair = provider.request(1);
    assert!(repair.prompt.ends_with(r#"{"title": "Doc"#));
    assert!(repair.system_prompt.is_none());
    assert!(repair.json_schema.is_none());
    assert_eq!(repair.model, "sonnet");
  }

  #[tokio::test]
  async fn test_unrecoverable_after_failed_repair() {
    let long_garbage = format!("{{ broken {}", "x".repeat(800));
    let provider = ScriptedProvider::new(&[Some(long_garbage.as_str()), Some("still { not json")]);

    let err = generate_structured::<Titled>(&provider, InferenceRequest::new("go"))
      .await
      .unwrap_err();
    assert_eq!(provider.calls(), 2);

    match err {
      RecoveryError::Unrecoverable { preview, .. } => {
        assert_eq!(preview.chars().count(), PREVIEW_CHARS);
        assert!(preview.starts_with("{ broken"));
      }
      other => panic!("expected unrecoverable error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_repair_call_failure_is_terminal() {
    let provider = ScriptedProvider::new(&[Some("not json"), None]);

    let err = generate_structured::<Titled>(&provider, InferenceRequest::new("go"))
      .await
      .unwrap_err();
    assert_eq!(provider.calls(), 2);
    match err {
      RecoveryError::Unrecoverable { repair_error, preview, .. } => {
        assert!(repair_error.contains("repair call failed"));
        assert_eq!(preview, "not json");
      }
      other => panic!("expected unrecoverable error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn test_generation_failure_makes_no_repair() {
    let provider = ScriptedProvider::new(&[None]);

    let err = generate_structured::<Titled>(&provider, InferenceRequest::new("go"))
      .await
      .unwrap_err();
    assert!(matches!(err, RecoveryError::Generation(LlmError::NoResponse)));
    assert_eq!(provider.calls(), 1);
  }
}
