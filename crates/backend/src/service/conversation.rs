//! Conversation summaries.
//!
//! The transcript is analyzed by the model into a [`ConversationAnalysis`],
//! which is folded into a [`Document`] here rather than by the model, so the
//! summary layout is always the same.

use chrono::{DateTime, Local};
use docsmith_core::{
  ConversationAnalysis, ConversationTurn, Document, Section, TranscriptEntry, format_transcript, normalize_transcript,
};
use llm::{
  generate_structured,
  prompts::{CONVERSATION_SCHEMA, build_conversation_prompt},
};
use render::OutputTarget;
use std::path::PathBuf;
use tracing::{debug, info};

use super::SynthesisContext;
use crate::PipelineError;

pub const SUMMARY_TITLE: &str = "Conversation Summary";
pub const ARTIFACT_PREFIX: &str = "conversation_summary";

const MISSING_SUMMARY: &str = "Not available.";
const MISSING_CONCLUSION: &str = "Conversation finished.";
const UNNAMED_SNIPPET: &str = "Code";

/// Parse a JSON transcript of `{role, content}` records or `[user, assistant]` pairs
pub fn parse_transcript(json: &str) -> Result<Vec<ConversationTurn>, serde_json::Error> {
  let entries: Vec<TranscriptEntry> = serde_json::from_str(json)?;
  Ok(normalize_transcript(entries))
}

fn bullets(items: &[String]) -> String {
  items.iter().map(|item| format!("• {}", item)).collect::<Vec<_>>().join("\n")
}

fn or_default(text: &str, fallback: &str) -> String {
  if text.trim().is_empty() {
    fallback.to_string()
  } else {
    text.to_string()
  }
}

fn bullet_section(sections: &mut Vec<Section>, heading: &str, items: &[String]) {
  if !items.is_empty() {
    sections.push(Section::heading(1, heading));
    sections.push(Section::paragraph(bullets(items)));
  }
}

/// Lay out an analysis as a summary document
///
/// Summary and Conclusions always appear; list sections are omitted when empty.
pub fn analysis_document(analysis: &ConversationAnalysis, generated_at: DateTime<Local>) -> Document {
  let mut sections = vec![
    Section::paragraph(format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M"))),
    Section::heading(1, "Summary"),
    Section::paragraph(or_default(&analysis.summary, MISSING_SUMMARY)),
  ];

  bullet_section(&mut sections, "Topics", &analysis.topics);

  if !analysis.code_snippets.is_empty() {
    sections.push(Section::heading(1, "Discussed Code"));
    for snippet in &analysis.code_snippets {
      sections.push(Section::heading(2, or_default(&snippet.description, UNNAMED_SNIPPET)));
      sections.push(Section::code(snippet.code.clone()));
    }
  }

  bullet_section(&mut sections, "Suggested Improvements", &analysis.improvements);
  bullet_section(&mut sections, "Best Practices", &analysis.practices);

  sections.push(Section::heading(1, "Conclusions"));
  sections.push(Section::paragraph(or_default(&analysis.conclusion, MISSING_CONCLUSION)));

  Document::new(SUMMARY_TITLE, sections)
}

/// Ask the model for a structured analysis of `turns`
///
/// An empty transcript is rejected before any generative call.
pub async fn analyze(ctx: &SynthesisContext<'_>, turns: &[ConversationTurn]) -> Result<ConversationAnalysis, PipelineError> {
  if turns.is_empty() {
    return Err(PipelineError::EmptyInput("the conversation is empty"));
  }

  let transcript = format_transcript(turns);
  debug!(turns = turns.len(), transcript_len = transcript.len(), "Analyzing conversation");

  let request = ctx
    .request(build_conversation_prompt(&transcript))
    .with_schema(CONVERSATION_SCHEMA);
  Ok(generate_structured(ctx.provider, request).await?)
}

/// Analyze `turns` and render the summary under a timestamped name
pub async fn summarize(ctx: &SynthesisContext<'_>, turns: &[ConversationTurn]) -> Result<PathBuf, PipelineError> {
  let analysis = analyze(ctx, turns).await?;
  let document = analysis_document(&analysis, Local::now());

  let path = ctx
    .renderer
    .translate(&document, &OutputTarget::timestamped(ARTIFACT_PREFIX))?;

  info!(
    path = %path.display(),
    topics = analysis.topics.len(),
    snippets = analysis.code_snippets.len(),
    "Conversation summary generated"
  );
  Ok(path)
}
