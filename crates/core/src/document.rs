//! Document object model consumed by the renderer.

use serde::{Deserialize, Serialize};

/// One block of document content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
  Heading { level: u8, text: String },
  Paragraph { text: String },
  CodeBlock { text: String },
}

impl Section {
  /// Heading with the level clamped to at least 1
  pub fn heading(level: u8, text: impl Into<String>) -> Self {
    Section::Heading {
      level: level.max(1),
      text: text.into(),
    }
  }

  pub fn paragraph(text: impl Into<String>) -> Self {
    Section::Paragraph { text: text.into() }
  }

  pub fn code(text: impl Into<String>) -> Self {
    Section::CodeBlock { text: text.into() }
  }

  pub fn text(&self) -> &str {
    match self {
      Section::Heading { text, .. } | Section::Paragraph { text } | Section::CodeBlock { text } => text,
    }
  }
}

/// A titled, ordered sequence of sections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
  pub title: String,
  #[serde(default)]
  pub sections: Vec<Section>,
}

impl Document {
  pub fn new(title: impl Into<String>, sections: Vec<Section>) -> Self {
    Self {
      title: title.into(),
      sections,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_heading_level_clamped() {
    assert_eq!(Section::heading(0, "Intro"), Section::Heading {
      level: 1,
      text: "Intro".to_string()
    });
  }

  #[test]
  fn test_document_without_sections_keeps_title() {
    let doc: Document = serde_json::from_str(r#"{"title": ""}"#).unwrap();
    assert_eq!(doc.title, "");
    assert!(doc.sections.is_empty());
  }
}
