//! Conversation transcripts and the analysis produced from them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  Assistant,
}

impl Role {
  /// Label used when a transcript is flattened into prompt text
  pub fn label(&self) -> &'static str {
    match self {
      Role::User => "User",
      Role::Assistant => "Assistant",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
  pub role: Role,
  pub content: String,
}

impl ConversationTurn {
  pub fn user(content: impl Into<String>) -> Self {
    Self {
      role: Role::User,
      content: content.into(),
    }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self {
      role: Role::Assistant,
      content: content.into(),
    }
  }
}

/// Transcript element as it may arrive from a chat frontend
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TranscriptEntry {
  Turn(ConversationTurn),
  /// `[user, assistant]` exchange
  Pair(String, String),
  Other(Value),
}

/// Best-effort turn for an entry that is neither a record nor a pair
///
/// Objects with a `content` key keep only that content; the role is user only
/// when it says so. Anything else becomes assistant text.
fn loose_turn(value: Value) -> ConversationTurn {
  match value {
    Value::String(text) => ConversationTurn::assistant(text),
    Value::Object(mut map) if map.contains_key("content") => {
      let is_user = map
        .get("role")
        .and_then(Value::as_str)
        .is_some_and(|role| role.trim().eq_ignore_ascii_case("user"));
      let content = match map.remove("content") {
        Some(Value::String(text)) => text,
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
      };
      if is_user {
        ConversationTurn::user(content)
      } else {
        ConversationTurn::assistant(content)
      }
    }
    other => ConversationTurn::assistant(other.to_string()),
  }
}

/// Normalise loosely-shaped transcript entries into ordered turns.
///
/// Pairs expand to a user turn followed by an assistant turn; anything else
/// becomes an assistant turn holding its text.
pub fn normalize_transcript(entries: Vec<TranscriptEntry>) -> Vec<ConversationTurn> {
  let mut turns = Vec::with_capacity(entries.len());
  for entry in entries {
    match entry {
      TranscriptEntry::Turn(turn) => turns.push(turn),
      TranscriptEntry::Pair(user, assistant) => {
        turns.push(ConversationTurn::user(user));
        turns.push(ConversationTurn::assistant(assistant));
      }
      TranscriptEntry::Other(value) => turns.push(loose_turn(value)),
    }
  }
  turns
}

/// Render turns as labelled blocks separated by blank lines
pub fn format_transcript(turns: &[ConversationTurn]) -> String {
  turns
    .iter()
    .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Explicit `null` reads as the field's default, same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeSnippet {
  #[serde(deserialize_with = "null_as_default")]
  pub description: String,
  #[serde(deserialize_with = "null_as_default")]
  pub code: String,
}

/// Structured summary of a conversation; every field is optional on input
/// and may be `null`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationAnalysis {
  #[serde(deserialize_with = "null_as_default")]
  pub summary: String,
  #[serde(deserialize_with = "null_as_default")]
  pub topics: Vec<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub code_snippets: Vec<CodeSnippet>,
  #[serde(deserialize_with = "null_as_default")]
  pub improvements: Vec<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub practices: Vec<String>,
  #[serde(deserialize_with = "null_as_default")]
  pub conclusion: String,
}
