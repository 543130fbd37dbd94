//! Python syntax tree walkers

use tree_sitter::Node;

use docsmith_core::{ClassInfo, FunctionInfo, NO_DOCSTRING, StructureReport};

/// Collect functions, classes and imports from the module's top-level statements
pub(crate) fn collect_structure(root: Node<'_>, source: &[u8]) -> StructureReport {
  let mut report = StructureReport::default();

  for node in named_children(root) {
    let node = unwrap_decorated(node);
    match node.kind() {
      "function_definition" => report.functions.push(function_info(node, source)),
      "class_definition" => report.classes.push(class_info(node, source)),
      "import_statement" => report.imports.extend(import_names(node, source)),
      "import_from_statement" => report.imports.push(from_import_module(node, source)),
      "future_import_statement" => report.imports.push("__future__".to_string()),
      _ => {}
    }
  }

  report
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
  let mut cursor = node.walk();
  node.named_children(&mut cursor).collect()
}

fn text<'a>(node: Node<'_>, source: &'a [u8]) -> &'a str {
  node.utf8_text(source).unwrap_or_default()
}

/// `@decorator def f(): ...` is still a function definition
fn unwrap_decorated(node: Node<'_>) -> Node<'_> {
  if node.kind() == "decorated_definition" {
    node.child_by_field_name("definition").unwrap_or(node)
  } else {
    node
  }
}

fn field_text(node: Node<'_>, field: &str, source: &[u8]) -> String {
  node
    .child_by_field_name(field)
    .map(|n| text(n, source).to_string())
    .unwrap_or_default()
}

fn function_info(node: Node<'_>, source: &[u8]) -> FunctionInfo {
  FunctionInfo {
    name: field_text(node, "name", source),
    docstring: docstring(node.child_by_field_name("body"), source).unwrap_or_else(|| NO_DOCSTRING.to_string()),
    param_names: node
      .child_by_field_name("parameters")
      .map(|params| positional_params(params, source))
      .unwrap_or_default(),
  }
}

fn class_info(node: Node<'_>, source: &[u8]) -> ClassInfo {
  let body = node.child_by_field_name("body");

  let method_names = body
    .map(|body| {
      named_children(body)
        .into_iter()
        .map(unwrap_decorated)
        .filter(|n| n.kind() == "function_definition")
        .map(|n| field_text(n, "name", source))
        .collect()
    })
    .unwrap_or_default();

  ClassInfo {
    name: field_text(node, "name", source),
    docstring: docstring(body, source).unwrap_or_else(|| NO_DOCSTRING.to_string()),
    method_names,
  }
}

/// Parameter names up to the first `*`, `*args` or `**kwargs`
fn positional_params(params: Node<'_>, source: &[u8]) -> Vec<String> {
  let mut names = Vec::new();

  for param in named_children(params) {
    match param.kind() {
      "identifier" => names.push(text(param, source).to_string()),
      "default_parameter" | "typed_default_parameter" => {
        if let Some(name) = param.child_by_field_name("name") {
          names.push(text(name, source).to_string());
        }
      }
      "typed_parameter" => match named_children(param).first() {
        Some(inner) if inner.kind() == "identifier" => names.push(text(*inner, source).to_string()),
        // `*args: T` / `**kwargs: T`
        _ => break,
      },
      "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => break,
      _ => {}
    }
  }

  names
}

/// `import a.b, c as d` -> ["a.b", "c"]
fn import_names(node: Node<'_>, source: &[u8]) -> Vec<String> {
  let mut cursor = node.walk();
  node
    .children_by_field_name("name", &mut cursor)
    .map(|name| match name.kind() {
      "aliased_import" => field_text(name, "name", source),
      _ => text(name, source).to_string(),
    })
    .collect()
}

/// `from X import Y` -> "X"; relative dots are dropped
fn from_import_module(node: Node<'_>, source: &[u8]) -> String {
  let Some(module) = node.child_by_field_name("module_name") else {
    return String::new();
  };

  if module.kind() == "relative_import" {
    return named_children(module)
      .into_iter()
      .find(|n| n.kind() == "dotted_name")
      .map(|n| text(n, source).to_string())
      .unwrap_or_default();
  }

  text(module, source).to_string()
}

/// Docstring of a block: its first statement, if that is a plain string literal
fn docstring(body: Option<Node<'_>>, source: &[u8]) -> Option<String> {
  let first = named_children(body?).into_iter().find(|n| n.kind() != "comment")?;
  if first.kind() != "expression_statement" {
    return None;
  }

  let children = named_children(first);
  let [expr] = children.as_slice() else {
    return None;
  };
  if expr.kind() != "string" {
    return None;
  }

  string_literal_value(text(*expr, source)).map(|raw| clean_docstring(&raw))
}

/// Value of a Python string literal; `None` for bytes and f-strings
fn string_literal_value(literal: &str) -> Option<String> {
  let prefix_len = literal.find(['"', '\''])?;
  let prefix = literal[..prefix_len].to_lowercase();
  if prefix.contains(['b', 'f', 't']) {
    return None;
  }

  let body = &literal[prefix_len..];
  let quote = if body.starts_with("\"\"\"") || body.starts_with("'''") {
    &body[..3]
  } else {
    &body[..1]
  };
  let inner = body.strip_prefix(quote)?.strip_suffix(quote)?;

  if prefix.contains('r') {
    Some(inner.to_string())
  } else {
    Some(unescape(inner))
  }
}

fn unescape(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('n') => out.push('\n'),
      Some('t') => out.push('\t'),
      Some('r') => out.push('\r'),
      Some('\\') => out.push('\\'),
      Some('\'') => out.push('\''),
      Some('"') => out.push('"'),
      // line continuation
      Some('\n') => {}
      Some(other) => {
        out.push('\\');
        out.push(other);
      }
      None => out.push('\\'),
    }
  }
  out
}

fn expand_tabs(line: &str) -> String {
  let mut out = String::with_capacity(line.len());
  let mut col = 0usize;
  for c in line.chars() {
    if c == '\t' {
      let pad = 8 - (col % 8);
      out.extend(std::iter::repeat_n(' ', pad));
      col += pad;
    } else {
      out.push(c);
      col += 1;
    }
  }
  out
}

/// Normalise docstring indentation the way Python's `inspect.cleandoc` does
fn clean_docstring(raw: &str) -> String {
  let lines: Vec<String> = raw.split('\n').map(expand_tabs).collect();

  let margin = lines
    .iter()
    .skip(1)
    .filter(|l| !l.trim_start().is_empty())
    .map(|l| l.len() - l.trim_start().len())
    .min()
    .unwrap_or(0);

  let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
  for (i, line) in lines.iter().enumerate() {
    if i == 0 {
      cleaned.push(line.trim_start().to_string());
    } else if line.len() >= margin && line.is_char_boundary(margin) {
      cleaned.push(line[margin..].to_string());
    } else {
      cleaned.push(line.trim_start().to_string());
    }
  }

  while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
    cleaned.pop();
  }
  let leading_blank = cleaned.iter().take_while(|l| l.trim().is_empty()).count();

  cleaned[leading_blank..].join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::analyze;
  use docsmith_core::{AnalysisReport, Language};
  use pretty_assertions::assert_eq;

  fn structure(code: &str) -> StructureReport {
    match analyze(code, &Language::Python) {
      AnalysisReport::Structure(report) => report,
      AnalysisReport::Error(err) => panic!("unexpected error report: {}", err.message),
    }
  }

  #[test]
  fn test_python_imports() {
    let content = r#"
import os
import os.path, sys as system
from pathlib import Path
from typing import Optional, List
from . import sibling
from ..parent import module
from __future__ import annotations
"#;
    let report = structure(content);
    assert_eq!(
      report.imports,
      vec!["os", "os.path", "sys", "pathlib", "typing", "", "parent", "__future__"]
    );
  }

  #[test]
  fn test_positional_params_only() {
    let report = structure(
      r#"
def f(self, a, b: int, c=1, d: str = "x", *args, e, **kwargs):
    pass

def g(a, /, b, *, c):
    pass

def h(*, key):
    pass
"#,
    );

    assert_eq!(report.functions[0].param_names, vec!["self", "a", "b", "c", "d"]);
    assert_eq!(report.functions[1].param_names, vec!["a", "b"]);
    assert!(report.functions[2].param_names.is_empty());
  }

  #[test]
  fn test_decorated_and_async_functions() {
    let report = structure(
      r#"
@cache
def cached(x):
    pass

async def fetch(url):
    """Fetch a URL."""
    pass
"#,
    );
    let names: Vec<_> = report.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["cached", "fetch"]);
    assert_eq!(report.functions[1].docstring, "Fetch a URL.");
  }

  #[test]
  fn test_multiline_docstring_is_cleaned() {
    let report = structure(
      r#"
def area(w, h):
    """Compute an area.

    Args:
        w: width
        h: height
    """
    return w * h
"#,
    );
    assert_eq!(
      report.functions[0].docstring,
      "Compute an area.\n\nArgs:\n    w: width\n    h: height"
    );
  }

  #[test]
  fn test_docstring_after_comment() {
    let report = structure("def f():\n    # note\n    'Doc.'\n    return 1\n");
    assert_eq!(report.functions[0].docstring, "Doc.");
  }

  #[test]
  fn test_non_string_first_statement_has_no_docstring() {
    let report = structure("def f():\n    x = 'not a docstring'\n");
    assert_eq!(report.functions[0].docstring, NO_DOCSTRING);

    let report = structure("def g():\n    f\"{x}\"\n");
    assert_eq!(report.functions[0].docstring, NO_DOCSTRING);
  }

  #[test]
  fn test_string_literal_value() {
    assert_eq!(string_literal_value(r#""""abc""""#), Some("abc".to_string()));
    assert_eq!(string_literal_value(r#"'a\tb'"#), Some("a\tb".to_string()));
    assert_eq!(string_literal_value(r#"r'a\tb'"#), Some("a\\tb".to_string()));
    assert_eq!(string_literal_value(r#"b'bytes'"#), None);
    assert_eq!(string_literal_value(r#""""#), Some(String::new()));
  }

  #[test]
  fn test_clean_docstring() {
    assert_eq!(clean_docstring("\n    Summary.\n\n    Details.\n    "), "Summary.\n\nDetails.");
    assert_eq!(clean_docstring("  One line  "), "One line  ");
  }
}
