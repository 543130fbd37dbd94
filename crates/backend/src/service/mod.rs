//! Generative pipelines.
//!
//! Each pipeline is a free function over a borrowed [`SynthesisContext`]:
//!
//! - [`documentation`] - code in, rendered technical documentation out
//! - [`conversation`] - transcript in, rendered conversation summary out
//! - [`assistant`] - free-form question in, retrieval-grounded reply out

pub mod assistant;
pub mod conversation;
pub mod documentation;

use docsmith_core::Config;
use index::{KnowledgeRetriever, RetrievedChunk};
use llm::{InferenceRequest, LlmProvider};
use render::Renderer;
use tracing::{debug, warn};

/// Collaborators shared by every pipeline.
pub struct SynthesisContext<'a> {
  pub provider: &'a dyn LlmProvider,
  pub retriever: &'a dyn KnowledgeRetriever,
  pub renderer: &'a Renderer,
  pub config: &'a Config,
}

impl<'a> SynthesisContext<'a> {
  pub fn new(
    provider: &'a dyn LlmProvider,
    retriever: &'a dyn KnowledgeRetriever,
    renderer: &'a Renderer,
    config: &'a Config,
  ) -> Self {
    Self {
      provider,
      retriever,
      renderer,
      config,
    }
  }

  /// Request carrying the configured model and timeout
  pub fn request(&self, prompt: impl Into<String>) -> InferenceRequest {
    InferenceRequest::new(prompt)
      .with_model(&self.config.llm.model)
      .with_timeout(self.config.llm.timeout_secs)
  }

  /// Up to `limit` retrieved passages joined by `separator`
  ///
  /// Retrieval failures are logged and yield `None`, as does an empty result.
  pub async fn context(&self, query: &str, limit: usize, separator: &str) -> Option<String> {
    match self.retriever.query(query).await {
      Ok(matches) if !matches.is_empty() => {
        debug!(matches = matches.len(), limit, "Retrieved context");
        Some(join_matches(&matches, limit, separator))
      }
      Ok(_) => {
        debug!("Retrieval returned no matches");
        None
      }
      Err(e) => {
        warn!(err = %e, "Retrieval failed");
        None
      }
    }
  }
}

fn join_matches(matches: &[RetrievedChunk], limit: usize, separator: &str) -> String {
  matches
    .iter()
    .take(limit)
    .map(|m| m.content.as_str())
    .collect::<Vec<_>>()
    .join(separator)
}
