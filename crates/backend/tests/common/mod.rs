//! Shared test doubles for the pipeline integration tests.

#![allow(dead_code)]

use std::{
  collections::VecDeque,
  path::PathBuf,
  sync::{Arc, Mutex},
};

use async_trait::async_trait;
use docsmith::{Docsmith, config::Config};
use index::{ChunkMetadata, KnowledgeRetriever, RetrievalError, RetrievedChunk};
use llm::{InferenceRequest, InferenceResponse, LlmError, LlmProvider};
use tempfile::TempDir;

/// LLM provider that replays a fixed script and records every request.
///
/// `None` entries, and calls past the end of the script, fail with
/// [`LlmError::NoResponse`].
#[derive(Clone, Default)]
pub struct ScriptedProvider {
  replies: Arc<Mutex<VecDeque<Option<String>>>>,
  requests: Arc<Mutex<Vec<InferenceRequest>>>,
}

impl ScriptedProvider {
  pub fn new(replies: &[Option<&str>]) -> Self {
    Self {
      replies: Arc::new(Mutex::new(replies.iter().map(|r| r.map(String::from)).collect())),
      ..Default::default()
    }
  }

  pub fn replying(replies: &[&str]) -> Self {
    let script: Vec<Option<&str>> = replies.iter().copied().map(Some).collect();
    Self::new(&script)
  }

  pub fn calls(&self) -> usize {
    self.requests.lock().unwrap().len()
  }

  pub fn request(&self, i: usize) -> InferenceRequest {
    self.requests.lock().unwrap()[i].clone()
  }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
  fn name(&self) -> &str {
    "scripted"
  }

  fn is_available(&self) -> bool {
    true
  }

  async fn infer(&self, request: InferenceRequest) -> llm::Result<InferenceResponse> {
    self.requests.lock().unwrap().push(request);
    match self.replies.lock().unwrap().pop_front().flatten() {
      Some(text) => Ok(InferenceResponse::from_text(text)),
      None => Err(LlmError::NoResponse),
    }
  }
}

/// Retriever returning fixed passages, best first
pub struct StaticRetriever {
  passages: Vec<String>,
}

impl StaticRetriever {
  pub fn new(passages: &[&str]) -> Self {
    Self {
      passages: passages.iter().map(|p| p.to_string()).collect(),
    }
  }
}

#[async_trait]
impl KnowledgeRetriever for StaticRetriever {
  async fn query(&self, _text: &str) -> Result<Vec<RetrievedChunk>, RetrievalError> {
    Ok(
      self
        .passages
        .iter()
        .enumerate()
        .map(|(i, content)| RetrievedChunk {
          content: content.clone(),
          metadata: ChunkMetadata {
            source: "static.txt".to_string(),
            chunk_index: i,
          },
          score: 1.0 - i as f32 * 0.1,
        })
        .collect(),
    )
  }
}

/// Retriever whose every query fails
pub struct FailingRetriever;

#[async_trait]
impl KnowledgeRetriever for FailingRetriever {
  async fn query(&self, _text: &str) -> Result<Vec<RetrievedChunk>, RetrievalError> {
    Err(RetrievalError::CorpusMissing(PathBuf::from("/nonexistent/knowledge_base")))
  }
}

/// Pipelines over test doubles, writing into a temp output directory.
pub struct TestContext {
  /// Temp directory - must be kept alive for the duration of the test
  pub temp_dir: TempDir,
  pub provider: ScriptedProvider,
  pub docsmith: Docsmith,
}

impl TestContext {
  pub fn new(provider: ScriptedProvider, retriever: Arc<dyn KnowledgeRetriever>) -> Self {
    let temp_dir = TempDir::new().expect("create temp dir");
    let mut config = Config::default();
    config.output.directory = temp_dir.path().join("data");

    let docsmith = Docsmith::new(Box::new(provider.clone()), retriever, config);
    Self {
      temp_dir,
      provider,
      docsmith,
    }
  }

  pub fn output_dir(&self) -> PathBuf {
    self.temp_dir.path().join("data")
  }

  pub fn artifacts(&self) -> Vec<PathBuf> {
    match std::fs::read_dir(self.output_dir()) {
      Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
      Err(_) => Vec::new(),
    }
  }
}
