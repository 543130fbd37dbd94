//! Prompts for documentation, conversation summaries, repair and chat
//!
//! Uses JSON schemas for structured output validation where the provider
//! supports it. Every structured prompt also spells out the expected shape,
//! since recovery has to cope with providers that ignore the schema.

use docsmith_core::AnalysisReport;
use tracing::trace;

/// JSON schema for generated documentation
pub const DOCUMENT_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "title": { "type": "string" },
    "sections": {
      "type": "array",
      "items": {
        "type": "object",
        "properties": {
          "type": { "type": "string", "enum": ["heading", "paragraph", "code"] },
          "level": { "type": "integer", "minimum": 1 },
          "content": { "type": "string" }
        },
        "required": ["type", "content"]
      }
    }
  },
  "required": ["title", "sections"]
}"#;

/// JSON schema for a conversation analysis
pub const CONVERSATION_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "summary": { "type": "string" },
    "topics": { "type": "array", "items": { "type": "string" } },
    "code_snippets": {
      "type": "array",
      "items": {
        "type": "object",
        "properties": {
          "description": { "type": "string" },
          "code": { "type": "string" }
        },
        "required": ["description", "code"]
      }
    },
    "improvements": { "type": "array", "items": { "type": "string" } },
    "practices": { "type": "array", "items": { "type": "string" } },
    "conclusion": { "type": "string" }
  },
  "required": ["summary", "topics", "code_snippets", "improvements", "practices", "conclusion"]
}"#;

const DOCUMENTATION_PROMPT: &str = r#"You are a technical writer. Write professional documentation for the code analyzed below.

INSTRUCTIONS:
1. Create a descriptive title
2. For each function and class, add:
   - A heading with its name
   - A paragraph explaining its purpose
   - Its docstring, if it has one
3. Finish with a section on the best practices applied

OUTPUT FORMAT (JSON):
Return ONLY valid JSON with exactly this structure:
{
  "title": "Documentation for <module>",
  "sections": [
    {"type": "heading", "level": 1, "content": "Introduction"},
    {"type": "paragraph", "content": "Overview..."},
    {"type": "heading", "level": 2, "content": "Function: name"},
    {"type": "paragraph", "content": "What the function does..."},
    {"type": "code", "content": "def name(a, b): ..."},
    {"type": "heading", "level": 1, "content": "Best Practices Applied"},
    {"type": "paragraph", "content": "..."}
  ]
}

Return ONLY the JSON, with no text before or after it. Close every brace and quote."#;

const CONVERSATION_PROMPT: &str = r#"You analyze technical conversations about programming.

INSTRUCTIONS:
Produce a structured JSON summary with these fields:
1. "summary": a concise paragraph (2-3 sentences) on the main subject
2. "topics": the main topics discussed (at most 5)
3. "code_snippets": code shared or discussed, each with "description" and "code"
4. "improvements": improvements or recommendations that came up
5. "practices": programming best practices discussed or applicable
6. "conclusion": the final takeaway (1-2 sentences)

OUTPUT FORMAT (JSON):
{
  "summary": "...",
  "topics": ["Topic 1", "Topic 2"],
  "code_snippets": [{"description": "Example function", "code": "def example():\n    pass"}],
  "improvements": ["..."],
  "practices": ["..."],
  "conclusion": "..."
}

If a field does not apply (for example no code was shared), use an empty list [] or an empty string "".
Return ONLY the JSON, with no text before or after it."#;

const REPAIR_PROMPT: &str = "The following text is meant to be a JSON object but is malformed. \
Return ONLY the corrected, valid JSON, with no commentary.\n\nTEXT:\n";

const ASSISTANT_INSTRUCTIONS: &str = "You are an assistant for code documentation and programming best practices. \
Answer clearly, concisely and professionally. You can review code the user shares and suggest how to document it better, \
and you can explain your own capabilities when asked. If the user wants a summary document of the conversation, \
tell them to ask for one explicitly, for example \"Summarize this conversation into a document\".";

/// Reply used when the assistant cannot reach the model
pub const ASSISTANT_FALLBACK_REPLY: &str = "I am a code documentation assistant. I can help with best practices, \
review code you share, and produce summary documents of our conversations. How can I help?";

/// Build the documentation prompt from a structure report and best practices
pub fn build_documentation_prompt(report: &AnalysisReport, best_practices: &str) -> String {
  let structure = report.to_prompt_json();
  let prompt = format!(
    "{}\n\nANALYZED CODE:\n{}\n\nBEST PRACTICES TO FOLLOW:\n{}",
    DOCUMENTATION_PROMPT, structure, best_practices
  );
  trace!(
    structure_len = structure.len(),
    practices_len = best_practices.len(),
    total_len = prompt.len(),
    "Built documentation prompt"
  );
  prompt
}

/// Build the conversation analysis prompt for a formatted transcript
pub fn build_conversation_prompt(transcript: &str) -> String {
  let prompt = format!("{}\n\nCONVERSATION:\n{}", CONVERSATION_PROMPT, transcript);
  trace!(
    transcript_len = transcript.len(),
    total_len = prompt.len(),
    "Built conversation prompt"
  );
  prompt
}

/// Build the repair prompt; it carries only the malformed candidate
pub fn build_repair_prompt(candidate: &str) -> String {
  format!("{}{}", REPAIR_PROMPT, candidate)
}

/// Build the chat prompt from retrieved context and the user's question
pub fn build_assistant_prompt(context: &str, question: &str) -> String {
  let prompt = format!(
    "{}\n\nKNOWLEDGE BASE CONTEXT:\n{}\n\nUSER QUESTION:\n{}\n\nANSWER:",
    ASSISTANT_INSTRUCTIONS, context, question
  );
  trace!(context_len = context.len(), total_len = prompt.len(), "Built assistant prompt");
  prompt
}

#[cfg(test)]
mod tests {
  use super::*;
  use docsmith_core::{ErrorReport, FunctionInfo, StructureReport};

  #[test]
  fn test_schemas_are_valid_json() {
    let doc: serde_json::Value = serde_json::from_str(DOCUMENT_SCHEMA).unwrap();
    assert_eq!(doc["required"][1], "sections");

    let conv: serde_json::Value = serde_json::from_str(CONVERSATION_SCHEMA).unwrap();
    assert_eq!(conv["properties"]["code_snippets"]["type"], "array");
  }

  #[test]
  fn test_documentation_prompt_embeds_structure_and_practices() {
    let report = AnalysisReport::Structure(StructureReport {
      functions: vec![FunctionInfo {
        name: "add".to_string(),
        docstring: "Add two numbers.".to_string(),
        param_names: vec!["a".to_string(), "b".to_string()],
      }],
      ..Default::default()
    });

    let prompt = build_documentation_prompt(&report, "- Include type hints");
    assert!(prompt.contains("\"add\""));
    assert!(prompt.contains("Add two numbers."));
    assert!(prompt.ends_with("BEST PRACTICES TO FOLLOW:\n- Include type hints"));
  }

  #[test]
  fn test_documentation_prompt_with_error_report() {
    let report = AnalysisReport::Error(ErrorReport::new("Syntax error: invalid syntax (line 1, column 5)"));
    let prompt = build_documentation_prompt(&report, "");
    assert!(prompt.contains("Syntax error"));
  }

  #[test]
  fn test_repair_prompt_is_context_free() {
    let prompt = build_repair_prompt(r#"{"title": "x""#);
    assert!(prompt.ends_with(r#"{"title": "x""#));
    assert!(!prompt.contains("ANALYZED CODE"));
  }

  #[test]
  fn test_assistant_prompt_layout() {
    let prompt = build_assistant_prompt("Use docstrings.", "How do I document a class?");
    let context_at = prompt.find("Use docstrings.").unwrap();
    let question_at = prompt.find("How do I document a class?").unwrap();
    assert!(context_at < question_at);
    assert!(prompt.ends_with("ANSWER:"));
  }
}
