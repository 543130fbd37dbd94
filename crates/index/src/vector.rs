use crate::RetrievedChunk;

/// In-memory embedding index searched by cosine similarity
#[derive(Debug, Default)]
pub struct VectorIndex {
  entries: Vec<(RetrievedChunk, Vec<f32>)>,
}

impl VectorIndex {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, chunk: RetrievedChunk, embedding: Vec<f32>) {
    self.entries.push((chunk, embedding));
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Top `k` chunks, most similar first; ties keep insertion order
  pub fn search(&self, query: &[f32], k: usize) -> Vec<RetrievedChunk> {
    let mut scored: Vec<(f32, &RetrievedChunk)> = self
      .entries
      .iter()
      .map(|(chunk, embedding)| (cosine_similarity(query, embedding), chunk))
      .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    scored
      .into_iter()
      .take(k)
      .map(|(score, chunk)| RetrievedChunk {
        score,
        ..chunk.clone()
      })
      .collect()
  }
}

/// Cosine similarity; zero vectors and length mismatches score 0
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() || a.is_empty() {
    return 0.0;
  }

  let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
  let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

  if norm_a == 0.0 || norm_b == 0.0 {
    return 0.0;
  }
  dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ChunkMetadata;

  fn chunk(content: &str, idx: usize) -> RetrievedChunk {
    RetrievedChunk {
      content: content.to_string(),
      metadata: ChunkMetadata {
        source: "kb.txt".to_string(),
        chunk_index: idx,
      },
      score: 0.0,
    }
  }

  #[test]
  fn test_cosine_similarity() {
    assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
  }

  #[test]
  fn test_search_orders_by_similarity() {
    let mut index = VectorIndex::new();
    index.insert(chunk("east", 0), vec![1.0, 0.0]);
    index.insert(chunk("north", 1), vec![0.0, 1.0]);
    index.insert(chunk("north-east", 2), vec![1.0, 1.0]);

    let results = index.search(&[0.1, 1.0], 2);
    let contents: Vec<_> = results.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["north", "north-east"]);
    assert!(results[0].score >= results[1].score);
  }

  #[test]
  fn test_search_empty_index() {
    assert!(VectorIndex::new().search(&[1.0], 3).is_empty());
  }
}
