//! StructureExtractor implementation

use tracing::{debug, trace};
use tree_sitter::{Language as TsLanguage, Node, Parser};

use crate::python;
use docsmith_core::{AnalysisReport, ErrorReport, Language, StructureReport};

/// Shallow structural extractor backed by tree-sitter
///
/// Lazily loads the Python grammar on first use. Only top-level statements
/// are inspected; nested scopes are never descended into except to read a
/// class's immediate methods.
pub struct StructureExtractor {
  python: Option<Parser>,
}

impl StructureExtractor {
  pub fn new() -> Self {
    Self { python: None }
  }

  /// Check if a language gets real structural analysis
  pub fn supports_language(&self, lang: &Language) -> bool {
    Self::get_grammar(lang).is_some()
  }

  /// Analyze source code.
  ///
  /// Never fails: syntax problems come back as [`AnalysisReport::Error`] and
  /// unsupported languages as a stub [`StructureReport`].
  pub fn analyze(&mut self, code: &str, lang: &Language) -> AnalysisReport {
    if !self.supports_language(lang) {
      debug!(language = %lang, "No structural analysis for language, returning stub report");
      return AnalysisReport::Structure(StructureReport::unsupported(lang));
    }

    let Some(parser) = self.ensure_loaded(lang) else {
      return AnalysisReport::Error(ErrorReport::new(format!("Failed to load {} grammar", lang)));
    };

    let Some(tree) = parser.parse(code, None) else {
      return AnalysisReport::Error(ErrorReport::new("Parser produced no syntax tree"));
    };

    let root = tree.root_node();
    if root.has_error() {
      let message = describe_syntax_error(root);
      debug!(language = %lang, message = %message, "Source has syntax errors");
      return AnalysisReport::Error(ErrorReport::new(message));
    }

    let report = python::collect_structure(root, code.as_bytes());
    trace!(
      functions = report.functions.len(),
      classes = report.classes.len(),
      imports = report.imports.len(),
      "Extracted structure"
    );
    AnalysisReport::Structure(report)
  }

  fn ensure_loaded(&mut self, lang: &Language) -> Option<&mut Parser> {
    if self.python.is_none() {
      let grammar = Self::get_grammar(lang)?;
      let mut parser = Parser::new();
      if parser.set_language(&grammar).is_err() {
        return None;
      }
      self.python = Some(parser);
    }
    self.python.as_mut()
  }

  fn get_grammar(lang: &Language) -> Option<TsLanguage> {
    match lang {
      Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
      // Unsupported or not compiled
      Language::Other(_) => None,
    }
  }
}

impl Default for StructureExtractor {
  fn default() -> Self {
    Self::new()
  }
}

/// One-shot analysis with a fresh extractor
pub fn analyze(code: &str, lang: &Language) -> AnalysisReport {
  StructureExtractor::new().analyze(code, lang)
}

/// Describe the first ERROR or MISSING node in document order
fn describe_syntax_error(root: Node<'_>) -> String {
  match first_syntax_fault(root) {
    Some(node) if node.is_missing() => format!(
      "Syntax error: missing '{}' (line {}, column {})",
      node.kind(),
      node.start_position().row + 1,
      node.start_position().column + 1
    ),
    Some(node) => format!(
      "Syntax error: invalid syntax (line {}, column {})",
      node.start_position().row + 1,
      node.start_position().column + 1
    ),
    None => "Syntax error: invalid syntax".to_string(),
  }
}

fn first_syntax_fault(node: Node<'_>) -> Option<Node<'_>> {
  if node.is_error() || node.is_missing() {
    return Some(node);
  }
  if !node.has_error() {
    return None;
  }
  let mut cursor = node.walk();
  let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
  children.into_iter().find_map(first_syntax_fault)
}

#[cfg(test)]
mod tests {
  use super::*;
  use docsmith_core::{ERROR_MESSAGE_LIMIT, NO_DOCSTRING};
  use pretty_assertions::assert_eq;

  fn structure(code: &str) -> StructureReport {
    match analyze(code, &Language::Python) {
      AnalysisReport::Structure(report) => report,
      AnalysisReport::Error(err) => panic!("unexpected error report: {}", err.message),
    }
  }

  // ============================================================================
  // LANGUAGE SUPPORT TESTS
  // ============================================================================

  #[test]
  fn test_supports_python_only() {
    let extractor = StructureExtractor::new();
    assert!(extractor.supports_language(&Language::Python));
    assert!(!extractor.supports_language(&Language::from_tag("rust")));
  }

  #[test]
  fn test_unsupported_language_returns_stub() {
    let report = analyze("fn main() {}", &Language::from_tag("rust"));
    let AnalysisReport::Structure(stub) = report else {
      panic!("unsupported language must not produce an error report");
    };
    assert!(stub.is_empty());
    assert!(stub.note.is_some());
  }

  // ============================================================================
  // ERROR HANDLING TESTS
  // ============================================================================

  #[test]
  fn test_syntax_error_returns_error_report() {
    let report = analyze("def broken(:\n    pass\n", &Language::Python);
    let AnalysisReport::Error(err) = report else {
      panic!("expected error report, got {:?}", report);
    };
    assert!(err.message.starts_with("Syntax error"), "message: {}", err.message);
    assert!(err.message.contains("line 1"), "message: {}", err.message);
    assert!(err.message.chars().count() <= ERROR_MESSAGE_LIMIT);
  }

  #[test]
  fn test_empty_content() {
    let report = structure("");
    assert!(report.is_empty());
    assert!(report.note.is_none());
  }

  #[test]
  fn test_extractor_reusable_across_calls() {
    let mut extractor = StructureExtractor::new();
    let first = extractor.analyze("def a():\n    pass\n", &Language::Python);
    let second = extractor.analyze("def b():\n    pass\n", &Language::Python);

    assert_eq!(first.as_structure().unwrap().functions[0].name, "a");
    assert_eq!(second.as_structure().unwrap().functions[0].name, "b");
  }

  // ============================================================================
  // STRUCTURE TESTS
  // ============================================================================

  #[test]
  fn test_function_with_docstring_and_params() {
    let report = structure(
      r#"
def add(a, b):
    """Add two numbers."""
    return a + b
"#,
    );

    assert_eq!(report.functions.len(), 1);
    let func = &report.functions[0];
    assert_eq!(func.name, "add");
    assert_eq!(func.param_names, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(func.docstring, "Add two numbers.");
  }

  #[test]
  fn test_function_without_docstring_uses_sentinel() {
    let report = structure("def sub(a, b):\n    return a - b\n");
    assert_eq!(report.functions[0].docstring, NO_DOCSTRING);
  }

  #[test]
  fn test_class_methods_and_docstring() {
    let report = structure(
      r#"
import os

class MyClass:
    '''Class docstring'''

    def method(self):
        def inner():
            pass
        pass

    @property
    def value(self):
        return 1

def my_function(a, b):
    '''Function docstring'''
    return a + b
"#,
    );

    assert_eq!(report.imports, vec!["os".to_string()]);
    assert_eq!(report.classes.len(), 1);
    assert_eq!(report.classes[0].name, "MyClass");
    assert_eq!(report.classes[0].docstring, "Class docstring");
    assert_eq!(report.classes[0].method_names, vec!["method".to_string(), "value".to_string()]);

    let names: Vec<_> = report.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["my_function"]);
  }

  #[test]
  fn test_nested_definitions_not_top_level() {
    let report = structure(
      r#"
if True:
    def hidden():
        pass

def outer():
    def inner():
        pass
"#,
    );
    let names: Vec<_> = report.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["outer"]);
  }
}
