//! Shared types for docsmith: the document model, structural analysis
//! reports, conversation transcripts, pipeline outcomes and configuration.

mod code;
pub mod config;
mod conversation;
mod document;
mod outcome;

pub use code::{
  AnalysisReport, ClassInfo, ERROR_MESSAGE_LIMIT, ErrorReport, FunctionInfo, Language, NO_DOCSTRING, StructureReport,
};
pub use config::Config;
pub use conversation::{
  CodeSnippet, ConversationAnalysis, ConversationTurn, Role, TranscriptEntry, format_transcript, normalize_transcript,
};
pub use document::{Document, Section};
pub use outcome::{GenerationOutcome, Outcome};
