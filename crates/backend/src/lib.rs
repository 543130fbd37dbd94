//! docsmith pipelines: structural analysis, retrieval and generation chained
//! into rendered documents.

mod error;
mod pipeline;
pub mod service;

pub use docsmith_core::config;
pub use error::PipelineError;
pub use pipeline::Docsmith;
pub use service::{
  SynthesisContext,
  conversation::{analysis_document, parse_transcript},
  documentation::DocumentParams,
};
