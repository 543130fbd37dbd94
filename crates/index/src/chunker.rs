use docsmith_core::config::RetrievalConfig;
use tracing::warn;

/// Configuration for the chunker
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
  /// Maximum characters per chunk
  pub chunk_size: usize,
  /// Characters carried over from the end of one chunk into the next
  pub chunk_overlap: usize,
  /// Split points tried in order, coarsest first. `""` splits into characters.
  pub separators: Vec<String>,
}

impl Default for ChunkerConfig {
  fn default() -> Self {
    Self {
      chunk_size: 1000,
      chunk_overlap: 200,
      separators: ["\n\n", "\n", " ", ""].into_iter().map(String::from).collect(),
    }
  }
}

impl ChunkerConfig {
  pub fn from_retrieval(config: &RetrievalConfig) -> Self {
    Self {
      chunk_size: config.chunk_size.max(1),
      chunk_overlap: config.chunk_overlap.min(config.chunk_size),
      ..Default::default()
    }
  }
}

/// Recursive character splitter
///
/// Splits on the coarsest separator present in the text, recursing into any
/// piece still longer than `chunk_size` with the next separator. Adjacent
/// small pieces are merged back up to `chunk_size`, with consecutive chunks
/// sharing up to `chunk_overlap` characters. Separators stay attached to the
/// start of the piece that follows them.
#[derive(Debug, Clone, Default)]
pub struct TextChunker {
  config: ChunkerConfig,
}

fn char_len(s: &str) -> usize {
  s.chars().count()
}

impl TextChunker {
  pub fn new(config: ChunkerConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &ChunkerConfig {
    &self.config
  }

  /// Split text into chunks; whitespace-only input yields nothing
  pub fn split(&self, text: &str) -> Vec<String> {
    self.split_recursive(text, &self.config.separators)
  }

  fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
    let mut separator = separators.last().map(String::as_str).unwrap_or("");
    let mut remaining: &[String] = &[];
    for (i, sep) in separators.iter().enumerate() {
      if sep.is_empty() {
        separator = "";
        break;
      }
      if text.contains(sep.as_str()) {
        separator = sep;
        remaining = &separators[i + 1..];
        break;
      }
    }

    let mut chunks = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for piece in split_keeping_separator(text, separator) {
      if char_len(piece) < self.config.chunk_size {
        pending.push(piece);
        continue;
      }

      if !pending.is_empty() {
        chunks.extend(self.merge(&pending));
        pending.clear();
      }
      if remaining.is_empty() {
        chunks.push(piece.to_string());
      } else {
        chunks.extend(self.split_recursive(piece, remaining));
      }
    }

    if !pending.is_empty() {
      chunks.extend(self.merge(&pending));
    }

    chunks
  }

  /// Greedily pack pieces into chunks, keeping an overlapping tail
  fn merge(&self, pieces: &[&str]) -> Vec<String> {
    let size = self.config.chunk_size;
    let overlap = self.config.chunk_overlap;

    let mut chunks = Vec::new();
    let mut current: std::collections::VecDeque<&str> = std::collections::VecDeque::new();
    let mut total = 0usize;

    for &piece in pieces {
      let len = char_len(piece);

      if total + len > size && !current.is_empty() {
        if total > size {
          warn!(chunk_chars = total, chunk_size = size, "Created chunk longer than the configured size");
        }
        push_joined(&mut chunks, &current);

        while let Some(front) = current.front()
          && (total > overlap || total + len > size)
        {
          total -= char_len(front);
          current.pop_front();
        }
      }

      current.push_back(piece);
      total += len;
    }

    push_joined(&mut chunks, &current);
    chunks
  }
}

fn push_joined(chunks: &mut Vec<String>, pieces: &std::collections::VecDeque<&str>) {
  let joined: String = pieces.iter().copied().collect();
  let trimmed = joined.trim();
  if !trimmed.is_empty() {
    chunks.push(trimmed.to_string());
  }
}

/// Split at every occurrence of `separator`, leaving the separator at the
/// start of the following piece. Empty pieces are dropped.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
  if separator.is_empty() {
    return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
  }

  let mut pieces = Vec::new();
  let mut start = 0;
  for (idx, _) in text.match_indices(separator) {
    if idx > start {
      pieces.push(&text[start..idx]);
    }
    start = idx;
  }
  if start < text.len() {
    pieces.push(&text[start..]);
  }
  pieces
}
