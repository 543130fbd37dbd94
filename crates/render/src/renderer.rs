use std::{
  ffi::OsStr,
  io::{self, Write},
  path::{Path, PathBuf},
};

use chrono::Utc;
use docsmith_core::{Document, config::OutputConfig};
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{Layout, RenderError, document_from_value, html};

const EXTENSION: &str = "html";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where an artifact lands inside the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
  /// Fixed single-component file name; re-rendering overwrites it
  Static(String),
  /// `{prefix}_YYYYMMDD_HHMMSS.html` in UTC, suffixed `_2`, `_3`, ... if taken
  Timestamped { prefix: String },
}

impl OutputTarget {
  pub fn fixed(name: impl Into<String>) -> Self {
    OutputTarget::Static(name.into())
  }

  pub fn timestamped(prefix: impl Into<String>) -> Self {
    OutputTarget::Timestamped { prefix: prefix.into() }
  }

  /// Reject names that would land outside the output directory
  pub fn validate(&self) -> Result<(), RenderError> {
    let name = match self {
      OutputTarget::Static(name) => name,
      OutputTarget::Timestamped { prefix } => prefix,
    };
    if is_plain_file_name(name) {
      Ok(())
    } else {
      Err(RenderError::InvalidFileName(name.clone()))
    }
  }
}

/// A written artifact and the boundary's notes about coerced input
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
  pub path: PathBuf,
  pub notes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Renderer {
  output_dir: PathBuf,
  lines_per_page: usize,
}

impl Renderer {
  pub fn new(output_dir: impl Into<PathBuf>) -> Self {
    Self {
      output_dir: output_dir.into(),
      lines_per_page: OutputConfig::default().lines_per_page,
    }
  }

  pub fn from_config(config: &OutputConfig) -> Self {
    Self::new(&config.directory).with_lines_per_page(config.lines_per_page)
  }

  pub fn with_lines_per_page(mut self, lines_per_page: usize) -> Self {
    self.lines_per_page = lines_per_page.max(1);
    self
  }

  pub fn output_dir(&self) -> &Path {
    &self.output_dir
  }

  /// Shape-check an untrusted value, then render it
  ///
  /// Shape errors are returned before anything touches the filesystem.
  pub fn render_value(&self, value: &Value, target: &OutputTarget) -> Result<RenderedArtifact, RenderError> {
    let shaped = document_from_value(value)?;
    let path = self.translate(&shaped.document, target)?;
    Ok(RenderedArtifact {
      path,
      notes: shaped.notes,
    })
  }

  /// Lay out, paginate and write `document`, returning the artifact path
  ///
  /// Names that would leave the output directory are rejected before
  /// anything touches the filesystem.
  pub fn translate(&self, document: &Document, target: &OutputTarget) -> Result<PathBuf, RenderError> {
    target.validate()?;

    let layout = Layout::from_document(document);
    let pages = layout.paginate(self.lines_per_page);
    let markup = html::emit(&document.title, &pages);

    std::fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::Io {
      path: self.output_dir.clone(),
      source,
    })?;

    let path = self.write_atomic(target, markup.as_bytes())?;

    info!(
      path = %path.display(),
      sections = document.sections.len(),
      pages = pages.len(),
      "Rendered document"
    );
    Ok(path)
  }

  /// Write through a temp file in the output directory, then move it into place
  ///
  /// Static names replace the existing file. Timestamped names never do; a
  /// taken name moves on to the next suffix.
  fn write_atomic(&self, target: &OutputTarget, contents: &[u8]) -> Result<PathBuf, RenderError> {
    let staging_err = |source| RenderError::Io {
      path: self.output_dir.clone(),
      source,
    };
    let mut file = NamedTempFile::new_in(&self.output_dir).map_err(staging_err)?;
    file.write_all(contents).map_err(staging_err)?;

    let path = match target {
      OutputTarget::Static(name) => {
        let path = self.output_dir.join(name);
        file.persist(&path).map_err(|e| RenderError::Io {
          path: path.clone(),
          source: e.error,
        })?;
        path
      }
      OutputTarget::Timestamped { prefix } => {
        let stem = format!("{}_{}", prefix, Utc::now().format(TIMESTAMP_FORMAT));
        let mut attempt = 1;
        loop {
          let path = self.candidate(&stem, attempt);
          match file.persist_noclobber(&path) {
            Ok(_) => break path,
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
              debug!(path = %path.display(), "Artifact name taken");
              file = e.file;
              attempt += 1;
            }
            Err(e) => return Err(RenderError::Io { path, source: e.error }),
          }
        }
      }
    };

    debug!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
    Ok(path)
  }

  fn candidate(&self, stem: &str, attempt: usize) -> PathBuf {
    if attempt == 1 {
      self.output_dir.join(format!("{}.{}", stem, EXTENSION))
    } else {
      self.output_dir.join(format!("{}_{}.{}", stem, attempt, EXTENSION))
    }
  }
}

/// Exactly one normal path component
fn is_plain_file_name(name: &str) -> bool {
  Path::new(name).file_name() == Some(OsStr::new(name))
}
