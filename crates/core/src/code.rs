use serde::{Deserialize, Serialize};

/// Docstring placeholder used when a definition has none
pub const NO_DOCSTRING: &str = "No docstring";

/// Maximum length (in characters) of an [`ErrorReport`] message
pub const ERROR_MESSAGE_LIMIT: usize = 100;

/// Source language of a piece of code handed to the extractor.
///
/// Python is the only language with real structural analysis; every other
/// tag is carried through so the stub report can name it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  Python,
  Other(String),
}

impl Language {
  /// Resolve a language tag such as `"python"` or `"Py"`
  pub fn from_tag(tag: &str) -> Self {
    match tag.trim().to_lowercase().as_str() {
      "python" | "py" | "python3" => Language::Python,
      other => Language::Other(other.to_string()),
    }
  }

  pub fn from_extension(ext: &str) -> Option<Self> {
    match ext.to_lowercase().as_str() {
      "py" | "pyi" | "pyw" => Some(Language::Python),
      "" => None,
      other => Some(Language::Other(other.to_string())),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Language::Python => "python",
      Language::Other(tag) => tag,
    }
  }

  pub fn is_supported(&self) -> bool {
    matches!(self, Language::Python)
  }
}

impl std::fmt::Display for Language {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A top-level function found by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
  pub name: String,
  pub docstring: String,
  /// Positional parameter names, in declaration order
  pub param_names: Vec<String>,
}

/// A top-level class found by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
  pub name: String,
  pub docstring: String,
  /// Names of functions defined directly in the class body
  pub method_names: Vec<String>,
}

/// Shallow structural summary of a source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureReport {
  pub functions: Vec<FunctionInfo>,
  pub classes: Vec<ClassInfo>,
  pub imports: Vec<String>,
  /// Set on the stub report returned for unsupported languages
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
}

impl StructureReport {
  /// Stub report for a language without structural analysis
  pub fn unsupported(language: &Language) -> Self {
    Self {
      note: Some(format!(
        "Detailed analysis is only available for Python; '{}' was not analyzed.",
        language
      )),
      ..Default::default()
    }
  }

  pub fn is_empty(&self) -> bool {
    self.functions.is_empty() && self.classes.is_empty() && self.imports.is_empty()
  }
}

/// Extraction failure carried as data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
  pub message: String,
}

impl ErrorReport {
  /// Build a report, truncating the message to [`ERROR_MESSAGE_LIMIT`] characters
  pub fn new(message: impl AsRef<str>) -> Self {
    Self {
      message: message.as_ref().chars().take(ERROR_MESSAGE_LIMIT).collect(),
    }
  }
}

/// Result of structural analysis: exactly one of the two shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReport {
  Structure(StructureReport),
  Error(ErrorReport),
}

impl AnalysisReport {
  pub fn as_structure(&self) -> Option<&StructureReport> {
    match self {
      AnalysisReport::Structure(report) => Some(report),
      AnalysisReport::Error(_) => None,
    }
  }

  pub fn is_error(&self) -> bool {
    matches!(self, AnalysisReport::Error(_))
  }

  /// Pretty JSON used as prompt context
  pub fn to_prompt_json(&self) -> String {
    serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_language_from_tag() {
    assert_eq!(Language::from_tag("Python"), Language::Python);
    assert_eq!(Language::from_tag(" py "), Language::Python);
    assert_eq!(Language::from_tag("rust"), Language::Other("rust".to_string()));
    assert!(!Language::from_tag("go").is_supported());
  }

  #[test]
  fn test_language_from_extension() {
    assert_eq!(Language::from_extension("PY"), Some(Language::Python));
    assert_eq!(Language::from_extension("rs"), Some(Language::Other("rs".to_string())));
    assert_eq!(Language::from_extension(""), None);
  }

  #[test]
  fn test_error_report_truncates() {
    let report = ErrorReport::new("x".repeat(250));
    assert_eq!(report.message.chars().count(), ERROR_MESSAGE_LIMIT);

    let short = ErrorReport::new("bad indent");
    assert_eq!(short.message, "bad indent");
  }

  #[test]
  fn test_unsupported_stub_is_structure() {
    let report = StructureReport::unsupported(&Language::from_tag("go"));
    assert!(report.is_empty());
    assert!(report.note.as_deref().unwrap_or_default().contains("'go'"));
  }

  #[test]
  fn test_report_serializes_untagged() {
    let report = AnalysisReport::Error(ErrorReport::new("syntax error"));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json, serde_json::json!({ "message": "syntax error" }));

    let structure = AnalysisReport::Structure(StructureReport {
      imports: vec!["os".to_string()],
      ..Default::default()
    });
    let json = serde_json::to_value(&structure).unwrap();
    assert_eq!(json["imports"][0], "os");
    assert!(json.get("note").is_none());
  }
}
