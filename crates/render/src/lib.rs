//! Renders [`Document`](docsmith_core::Document)s into standalone HTML artifacts
//!
//! Untrusted JSON enters through [`document_from_value`], which rejects shapes
//! that cannot be a document and coerces the rest. The document is folded
//! into a [`Layout`], paginated, and written atomically.

mod html;
mod layout;
mod renderer;
mod shape;

pub use layout::{Block, Layout};
pub use renderer::{OutputTarget, RenderedArtifact, Renderer};
pub use shape::{ShapedDocument, document_from_value};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
  #[error("Document must be a JSON object, got {0}")]
  NotAnObject(&'static str),
  #[error("Document title must be text, got {0}")]
  InvalidTitle(&'static str),
  #[error("Document sections must be a list, got {0}")]
  SectionsNotAList(&'static str),
  #[error("Section {index} must be an object, got {kind}")]
  SectionNotAnObject { index: usize, kind: &'static str },
  #[error("Section {index} has an invalid heading level: {value}")]
  InvalidHeadingLevel { index: usize, value: String },
  #[error("Invalid artifact file name: {0:?}")]
  InvalidFileName(String),
  #[error("Failed to write {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
