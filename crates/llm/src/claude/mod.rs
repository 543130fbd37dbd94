//! Generation through the `claude` CLI
//!
//! Runs the CLI in print mode with JSON output, hooks and tools disabled, and
//! feeds the prompt over stdin. A JSON schema is forwarded only when the
//! request carries one; repair prompts go out without it.

use std::{
  process::Stdio,
  time::{Duration, Instant},
};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::{
  io::{AsyncReadExt, AsyncWriteExt},
  process::Command,
  time::timeout,
};
use tracing::{debug, error, trace, warn};

use crate::{InferenceRequest, InferenceResponse, LlmError, LlmProvider, Result};

#[derive(Debug, Clone)]
pub struct ClaudeProvider {
  /// Resolved path to the claude executable, empty when not found
  claude_path: String,
}

impl ClaudeProvider {
  /// Looks the executable up in PATH; check `is_available()` before use
  pub fn new() -> Self {
    Self {
      claude_path: find_claude().unwrap_or_default(),
    }
  }
}

impl Default for ClaudeProvider {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
  fn name(&self) -> &str {
    "claude-cli"
  }

  fn is_available(&self) -> bool {
    !self.claude_path.is_empty()
  }

  async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse> {
    if self.claude_path.is_empty() {
      return Err(LlmError::ClaudeNotFound);
    }
    run_claude(&self.claude_path, request).await
  }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
enum ClaudeMessage {
  User {},
  System {},
  Assistant(AssistantMessage),
  Result(ResultMessage),
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
  message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
  content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
enum ContentBlock {
  Text {
    text: String,
  },
  #[serde(other)]
  Other,
}

#[derive(Debug, Deserialize)]
struct ResultMessage {
  #[serde(default)]
  is_error: bool,
  #[serde(default)]
  duration_ms: u64,
  #[serde(default)]
  total_cost_usd: f64,
  usage: Option<Usage>,
  result: Option<String>,
  /// Present when --json-schema was used
  structured_output: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Usage {
  input_tokens: u32,
  output_tokens: u32,
}

fn find_claude() -> Result<String> {
  let which_cmd = if cfg!(windows) { "where" } else { "which" };

  let output = std::process::Command::new(which_cmd)
    .arg("claude")
    .output()
    .map_err(|e| {
      debug!(err = %e, "Failed to execute 'which claude'");
      LlmError::ClaudeNotFound
    })?;

  if !output.status.success() {
    debug!("Claude executable not found in PATH");
    return Err(LlmError::ClaudeNotFound);
  }

  let path = String::from_utf8_lossy(&output.stdout)
    .lines()
    .next()
    .map(|s| s.trim().to_string())
    .unwrap_or_default();

  if path.is_empty() {
    return Err(LlmError::ClaudeNotFound);
  }

  trace!(claude_path = %path, "Found claude executable");
  Ok(path)
}

fn build_command(claude_path: &str, request: &InferenceRequest) -> Command {
  let mut cmd = Command::new(claude_path);
  cmd
    .arg("-p")
    .arg("--model")
    .arg(&request.model)
    .arg("--output-format")
    .arg("json")
    .arg("--no-session-persistence")
    .arg("--settings")
    .arg(r#"{"hooks":{}}"#)
    .arg("--setting-sources")
    .arg("")
    // text generation only
    .arg("--tools")
    .arg("");

  if let Some(schema) = request.json_schema.as_deref()
    && !schema.is_empty()
  {
    cmd.arg("--json-schema").arg(schema);
  }

  cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
  cmd
}

async fn run_claude(claude_path: &str, request: InferenceRequest) -> Result<InferenceResponse> {
  let start = Instant::now();
  let prompt = request.full_prompt();

  debug!(
    model = %request.model,
    prompt_len = prompt.len(),
    timeout_secs = request.timeout_secs,
    has_schema = request.json_schema.is_some(),
    "Starting inference request"
  );

  let mut child = build_command(claude_path, &request).spawn().map_err(|e| {
    error!(err = %e, "Failed to spawn Claude CLI process");
    LlmError::SpawnFailed(e)
  })?;

  if let Some(mut stdin) = child.stdin.take() {
    stdin.write_all(prompt.as_bytes()).await?;
    // EOF ends the prompt
    drop(stdin);
  }

  let mut stdout = child
    .stdout
    .take()
    .ok_or_else(|| std::io::Error::other("stdout not piped"))?;

  let read_future = async {
    let mut output = String::new();
    stdout.read_to_string(&mut output).await?;
    Ok::<_, std::io::Error>(output)
  };

  let output = match timeout(Duration::from_secs(request.timeout_secs), read_future).await {
    Ok(result) => result?,
    Err(_) => {
      warn!(
        timeout_secs = request.timeout_secs,
        elapsed_ms = start.elapsed().as_millis() as u64,
        model = %request.model,
        "Claude CLI timed out"
      );
      let _ = child.kill().await;
      return Err(LlmError::Timeout(request.timeout_secs));
    }
  };

  let status = child.wait().await?;
  if !status.success() {
    let exit_code = status.code().unwrap_or(-1);
    error!(exit_code, model = %request.model, "Claude CLI process failed");
    return Err(LlmError::ProcessFailed(exit_code));
  }

  let response = parse_output(&output)?;

  debug!(
    response_len = response.text.len(),
    input_tokens = response.input_tokens,
    output_tokens = response.output_tokens,
    cost_usd = ?response.cost_usd,
    elapsed_ms = start.elapsed().as_millis() as u64,
    model = %request.model,
    "Inference completed"
  );

  Ok(response)
}

/// Parse the CLI's JSON array output (`[{system}, {assistant}, {result}]`)
///
/// Structured output, when present, wins over the assistant text and is
/// handed back re-serialized so callers parse one representation.
fn parse_output(output: &str) -> Result<InferenceResponse> {
  let messages: Vec<ClaudeMessage> = serde_json::from_str(output).map_err(|e| {
    warn!(
      err = %e,
      output_len = output.len(),
      output_preview = %output.chars().take(200).collect::<String>(),
      "Failed to parse Claude CLI JSON response"
    );
    LlmError::ParseError(e)
  })?;

  let mut text = String::new();
  let mut structured_output = None;
  let mut response = InferenceResponse::default();

  for msg in messages {
    match msg {
      ClaudeMessage::User {} | ClaudeMessage::System {} => {}
      ClaudeMessage::Assistant(assistant) => {
        for block in assistant.message.content {
          if let ContentBlock::Text { text: part } = block {
            text.push_str(&part);
          }
        }
      }
      ClaudeMessage::Result(result) => {
        if result.is_error {
          let message = result.result.unwrap_or_else(|| "Unknown error".to_string());
          error!(error_msg = %message, "Claude returned an error");
          return Err(LlmError::ClaudeError(message));
        }

        response.duration_ms = result.duration_ms;
        response.cost_usd = Some(result.total_cost_usd);
        structured_output = result.structured_output;
        if let Some(usage) = result.usage {
          response.input_tokens = usage.input_tokens;
          response.output_tokens = usage.output_tokens;
        }
      }
    }
  }

  response.text = match structured_output {
    Some(structured) => serde_json::to_string(&structured)?,
    None => text,
  };

  if response.text.is_empty() {
    return Err(LlmError::NoResponse);
  }

  Ok(response)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_output_assistant_text() {
    let output = r#"[
      {"type": "system"},
      {"type": "assistant", "message": {"content": [{"type": "text", "text": "{\"title\": "}, {"type": "text", "text": "\"Doc\"}"}]}},
      {"type": "result", "duration_ms": 12, "total_cost_usd": 0.01, "usage": {"input_tokens": 5, "output_tokens": 7}, "result": "done"}
    ]"#;

    let response = parse_output(output).unwrap();
    assert_eq!(response.text, r#"{"title": "Doc"}"#);
    assert_eq!(response.input_tokens, 5);
    assert_eq!(response.output_tokens, 7);
    assert_eq!(response.duration_ms, 12);
  }

  #[test]
  fn test_parse_output_prefers_structured_output() {
    let output = r#"[
      {"type": "assistant", "message": {"content": [{"type": "tool_use"}, {"type": "text", "text": "ignored"}]}},
      {"type": "result", "structured_output": {"title": "T", "sections": []}}
    ]"#;

    let response = parse_output(output).unwrap();
    let value: serde_json::Value = serde_json::from_str(&response.text).unwrap();
    assert_eq!(value["title"], "T");
  }

  #[test]
  fn test_parse_output_errors() {
    let error = r#"[{"type": "result", "is_error": true, "result": "overloaded"}]"#;
    assert!(matches!(parse_output(error), Err(LlmError::ClaudeError(m)) if m == "overloaded"));

    let empty = r#"[{"type": "result"}]"#;
    assert!(matches!(parse_output(empty), Err(LlmError::NoResponse)));

    assert!(matches!(parse_output("not json"), Err(LlmError::ParseError(_))));
  }

  #[test]
  fn test_schema_flag_only_when_present() {
    let args = |request: &InferenceRequest| -> Vec<String> {
      build_command("claude", request)
        .as_std()
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
    };

    let plain = InferenceRequest::new("fix this");
    assert!(!args(&plain).contains(&"--json-schema".to_string()));

    let with_schema = InferenceRequest::new("document this").with_schema(r#"{"type":"object"}"#);
    let with_args = args(&with_schema);
    let pos = with_args.iter().position(|a| a == "--json-schema").unwrap();
    assert_eq!(with_args[pos + 1], r#"{"type":"object"}"#);
  }

  #[tokio::test]
  #[ignore = "requires claude CLI"]
  async fn test_claude_provider_infer() {
    let provider = ClaudeProvider::new();
    assert!(provider.is_available());

    let request = InferenceRequest::new("Say 'hello' and nothing else").with_timeout(30);
    let response = provider.infer(request).await.unwrap();
    assert!(response.text.to_lowercase().contains("hello"));
  }
}
