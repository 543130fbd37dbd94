//! CLI command implementations

mod admin;
mod generate;
mod inspect;

pub use admin::{cmd_config_init, cmd_config_show};
pub use generate::{cmd_ask, cmd_document, cmd_summarize};
pub use inspect::{cmd_analyze, cmd_search};

use std::{io::Read, path::Path};

use anyhow::{Context, Result};
use docsmith_core::Language;

/// Read a file, or stdin when `path` is `-`
fn read_input(path: &str) -> Result<String> {
  if path == "-" {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
    return Ok(buf);
  }
  std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
}

/// Explicit tag first, then the file extension, then the configured default
fn resolve_language(path: &str, tag: Option<&str>, default: &str) -> Language {
  if let Some(tag) = tag {
    return Language::from_tag(tag);
  }
  Path::new(path)
    .extension()
    .and_then(|ext| ext.to_str())
    .and_then(Language::from_extension)
    .unwrap_or_else(|| Language::from_tag(default))
}
