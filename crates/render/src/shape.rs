use docsmith_core::{Document, Section};
use serde_json::{Map, Value};
use tracing::warn;

use crate::RenderError;

/// A document accepted at the boundary, with notes on anything coerced
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedDocument {
  pub document: Document,
  pub notes: Vec<String>,
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

/// Display text for a JSON value; compound values become their JSON text
fn coerce_text(value: Option<&Value>) -> String {
  match value {
    None | Some(Value::Null) => String::new(),
    Some(Value::String(s)) => s.clone(),
    Some(Value::Bool(b)) => b.to_string(),
    Some(Value::Number(n)) => n.to_string(),
    Some(compound) => compound.to_string(),
  }
}

fn heading_level(index: usize, value: Option<&Value>) -> Result<u8, RenderError> {
  let invalid = |v: &Value| RenderError::InvalidHeadingLevel {
    index,
    value: v.to_string(),
  };

  let level = match value {
    None | Some(Value::Null) => 1,
    Some(Value::Number(n)) => match n.as_i64() {
      Some(i) => i,
      None => n.as_f64().map(|f| f.trunc() as i64).ok_or_else(|| invalid(&Value::Number(n.clone())))?,
    },
    Some(Value::Bool(b)) => i64::from(*b),
    Some(v @ Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid(v))?,
    Some(v) => return Err(invalid(v)),
  };

  Ok(level.clamp(1, i64::from(u8::MAX)) as u8)
}

fn shape_section(index: usize, section: &Map<String, Value>, notes: &mut Vec<String>) -> Result<Section, RenderError> {
  let content = coerce_text(section.get("content"));

  let section = match section.get("type") {
    None => Section::paragraph(content),
    Some(Value::String(tag)) if tag == "paragraph" => Section::paragraph(content),
    Some(Value::String(tag)) if tag == "heading" => Section::heading(heading_level(index, section.get("level"))?, content),
    Some(Value::String(tag)) if tag == "code" => Section::code(content),
    Some(other) => {
      let tag = coerce_text(Some(other));
      warn!(index, tag = %tag, "Unknown section type, rendering as paragraph");
      notes.push(format!("section {}: unknown type '{}' rendered as paragraph", index, tag));
      Section::paragraph(content)
    }
  };

  Ok(section)
}

/// Check and coerce an untrusted JSON value into a [`Document`]
///
/// Fatal: a non-object top level, a compound title, non-list sections, a
/// non-object section, or a heading level that is not a number. Everything
/// else is coerced, and unknown section types are noted.
pub fn document_from_value(value: &Value) -> Result<ShapedDocument, RenderError> {
  let Value::Object(root) = value else {
    return Err(RenderError::NotAnObject(json_kind(value)));
  };

  let title = match root.get("title") {
    Some(v @ (Value::Array(_) | Value::Object(_))) => return Err(RenderError::InvalidTitle(json_kind(v))),
    other => coerce_text(other),
  };

  let raw_sections: &[Value] = match root.get("sections") {
    None => &[],
    Some(Value::Array(items)) => items,
    Some(other) => return Err(RenderError::SectionsNotAList(json_kind(other))),
  };

  let mut notes = Vec::new();
  let mut sections = Vec::with_capacity(raw_sections.len());
  for (index, raw) in raw_sections.iter().enumerate() {
    let Value::Object(section) = raw else {
      return Err(RenderError::SectionNotAnObject {
        index,
        kind: json_kind(raw),
      });
    };
    sections.push(shape_section(index, section, &mut notes)?);
  }

  Ok(ShapedDocument {
    document: Document::new(title, sections),
    notes,
  })
}
