use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::RetrievalError;

/// One file of the knowledge base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
  pub source: PathBuf,
  pub text: String,
}

/// Load every file below `root` whose extension is in `extensions`
///
/// Files that cannot be read as UTF-8 text are skipped with a warning.
/// Documents are returned in file name order.
pub fn load_corpus(root: &Path, extensions: &[String]) -> Result<Vec<CorpusDocument>, RetrievalError> {
  if !root.is_dir() {
    return Err(RetrievalError::CorpusMissing(root.to_path_buf()));
  }

  let walker = WalkBuilder::new(root)
    .hidden(true) // Skip dotfiles
    .git_ignore(true)
    .git_exclude(true)
    .sort_by_file_name(|a, b| a.cmp(b))
    .build();

  let mut documents = Vec::new();
  for entry in walker.flatten() {
    let path = entry.path();

    if path.is_dir() {
      continue;
    }

    let matches_extension = path
      .extension()
      .and_then(|e| e.to_str())
      .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
    if !matches_extension {
      continue;
    }

    match std::fs::read_to_string(path) {
      Ok(text) => documents.push(CorpusDocument {
        source: path.to_path_buf(),
        text,
      }),
      Err(e) => warn!(path = %path.display(), err = %e, "Skipping unreadable corpus file"),
    }
  }

  debug!(root = %root.display(), documents = documents.len(), "Loaded knowledge base corpus");
  Ok(documents)
}
