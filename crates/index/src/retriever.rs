use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use docsmith_core::config::RetrievalConfig;
use embedding::{EmbeddingError, EmbeddingProvider};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::{ChunkerConfig, CorpusDocument, TextChunker, VectorIndex, load_corpus};

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
  #[error("Knowledge base not found: {}", .0.display())]
  CorpusMissing(PathBuf),
  #[error("Knowledge base is empty")]
  EmptyCorpus,
  #[error("Embedding error: {0}")]
  Embedding(#[from] EmbeddingError),
  #[error("Index build task failed: {0}")]
  Task(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkMetadata {
  pub source: String,
  pub chunk_index: usize,
}

/// A passage returned by a knowledge base query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
  pub content: String,
  pub metadata: ChunkMetadata,
  /// Cosine similarity, or term count on the lexical path
  pub score: f32,
}

/// Source of best-practice context for the generative pipelines
#[async_trait]
pub trait KnowledgeRetriever: Send + Sync {
  /// Matches for `text`, most relevant first
  async fn query(&self, text: &str) -> Result<Vec<RetrievedChunk>, RetrievalError>;
}

/// Embedding-backed retriever over a directory of text files
///
/// The index is built on the first query and cached for the lifetime of the
/// retriever. A failed build is not cached, so the next query retries it.
/// Queries that cannot use the index are answered by [`lexical_search`].
pub struct IndexedRetriever {
  config: RetrievalConfig,
  chunker: TextChunker,
  embedder: Arc<dyn EmbeddingProvider>,
  index: OnceCell<VectorIndex>,
}

impl IndexedRetriever {
  pub fn new(config: RetrievalConfig, embedder: Arc<dyn EmbeddingProvider>) -> Self {
    let chunker = TextChunker::new(ChunkerConfig::from_retrieval(&config));
    Self {
      config,
      chunker,
      embedder,
      index: OnceCell::new(),
    }
  }

  pub fn is_indexed(&self) -> bool {
    self.index.initialized()
  }

  async fn index(&self) -> Result<&VectorIndex, RetrievalError> {
    self.index.get_or_try_init(|| self.build_index()).await
  }

  async fn load(&self) -> Result<Vec<CorpusDocument>, RetrievalError> {
    let root = self.config.knowledge_base.clone();
    let extensions = self.config.extensions.clone();
    tokio::task::spawn_blocking(move || load_corpus(&root, &extensions))
      .await
      .map_err(|e| RetrievalError::Task(e.to_string()))?
  }

  async fn build_index(&self) -> Result<VectorIndex, RetrievalError> {
    let documents = self.load().await?;

    let mut chunks = Vec::new();
    for doc in &documents {
      let source = doc.source.display().to_string();
      for (chunk_index, content) in self.chunker.split(&doc.text).into_iter().enumerate() {
        chunks.push(RetrievedChunk {
          content,
          metadata: ChunkMetadata {
            source: source.clone(),
            chunk_index,
          },
          score: 0.0,
        });
      }
    }

    if chunks.is_empty() {
      return Err(RetrievalError::EmptyCorpus);
    }

    let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    let embeddings = self.embedder.embed_batch(&texts).await?;

    let mut index = VectorIndex::new();
    for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
      index.insert(chunk, embedding);
    }

    info!(
      documents = documents.len(),
      chunks = index.len(),
      model = self.embedder.model_id(),
      "Knowledge base indexed"
    );
    Ok(index)
  }

  /// Query the embedding index, building it if needed
  pub async fn semantic_query(&self, text: &str) -> Result<Vec<RetrievedChunk>, RetrievalError> {
    let index = self.index().await?;
    let query = self.embedder.embed(text).await?;
    Ok(index.search(&query, self.config.top_k))
  }

  /// Term-count search straight over the corpus files
  pub async fn lexical_query(&self, text: &str) -> Result<Vec<RetrievedChunk>, RetrievalError> {
    let documents = self.load().await?;
    Ok(lexical_search(
      &documents,
      text,
      self.config.top_k,
      self.config.fallback_prefix_chars,
    ))
  }
}

#[async_trait]
impl KnowledgeRetriever for IndexedRetriever {
  async fn query(&self, text: &str) -> Result<Vec<RetrievedChunk>, RetrievalError> {
    match self.semantic_query(text).await {
      Ok(results) => {
        debug!(matches = results.len(), "Semantic retrieval");
        Ok(results)
      }
      Err(e) => {
        warn!(err = %e, "Semantic retrieval unavailable, using lexical search");
        self.lexical_query(text).await
      }
    }
  }
}

/// Rank whole documents by how often the query's terms occur in them
///
/// Terms are the lowercased whitespace tokens longer than two characters.
/// Documents scoring above zero are returned best first, up to `top_k`. If
/// nothing scores, the first `prefix_chars` characters of the first document
/// are returned so callers still get some context.
pub fn lexical_search(
  documents: &[CorpusDocument],
  query: &str,
  top_k: usize,
  prefix_chars: usize,
) -> Vec<RetrievedChunk> {
  let query = query.to_lowercase();
  let terms: Vec<&str> = query.split_whitespace().filter(|t| t.chars().count() > 2).collect();

  let mut scored: Vec<(usize, &CorpusDocument)> = documents
    .iter()
    .map(|doc| {
      let text = doc.text.to_lowercase();
      let score = terms.iter().map(|t| text.matches(t).count()).sum();
      (score, doc)
    })
    .collect();
  scored.sort_by(|a, b| b.0.cmp(&a.0));

  let to_chunk = |doc: &CorpusDocument, content: String, score: usize| RetrievedChunk {
    content,
    metadata: ChunkMetadata {
      source: doc.source.display().to_string(),
      chunk_index: 0,
    },
    score: score as f32,
  };

  let matches: Vec<RetrievedChunk> = scored
    .iter()
    .filter(|(score, _)| *score > 0)
    .take(top_k)
    .map(|(score, doc)| to_chunk(*doc, doc.text.clone(), *score))
    .collect();

  if !matches.is_empty() {
    return matches;
  }

  match scored.first() {
    Some((_, doc)) => vec![to_chunk(*doc, doc.text.chars().take(prefix_chars).collect(), 0)],
    None => Vec::new(),
  }
}
