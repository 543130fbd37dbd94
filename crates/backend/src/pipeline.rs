use std::{path::PathBuf, sync::Arc};

use docsmith_core::{Config, ConversationTurn, GenerationOutcome};
use embedding::OllamaProvider;
use index::{IndexedRetriever, KnowledgeRetriever};
use llm::LlmProvider;
use render::{RenderedArtifact, Renderer};
use tracing::{error, info};

use crate::{
  PipelineError,
  service::{
    SynthesisContext, assistant, conversation,
    documentation::{self, DocumentParams},
  },
};

/// Owns the collaborators and runs the pipelines against them.
///
/// `try_*` methods return the typed error; `run_*` methods fold every result
/// into a [`GenerationOutcome`] for callers that only report.
pub struct Docsmith {
  provider: Box<dyn LlmProvider>,
  retriever: Arc<dyn KnowledgeRetriever>,
  renderer: Renderer,
  config: Config,
}

impl Docsmith {
  pub fn new(provider: Box<dyn LlmProvider>, retriever: Arc<dyn KnowledgeRetriever>, config: Config) -> Self {
    let renderer = Renderer::from_config(&config.output);
    Self {
      provider,
      retriever,
      renderer,
      config,
    }
  }

  /// Default collaborators: the first available LLM provider and an
  /// Ollama-backed retriever over the configured knowledge base
  pub fn from_config(config: Config) -> Result<Self, PipelineError> {
    let provider = llm::create_provider()?;
    let embedder = Arc::new(OllamaProvider::from_config(&config.embedding));
    let retriever = Arc::new(IndexedRetriever::new(config.retrieval.clone(), embedder));

    info!(
      provider = provider.name(),
      knowledge_base = %config.retrieval.knowledge_base.display(),
      output = %config.output.directory.display(),
      "Pipelines ready"
    );
    Ok(Self::new(provider, retriever, config))
  }

  fn context(&self) -> SynthesisContext<'_> {
    SynthesisContext::new(
      self.provider.as_ref(),
      self.retriever.as_ref(),
      &self.renderer,
      &self.config,
    )
  }

  pub async fn try_document(&self, params: DocumentParams) -> Result<RenderedArtifact, PipelineError> {
    documentation::generate(&self.context(), params).await
  }

  pub async fn run_document(&self, params: DocumentParams) -> GenerationOutcome {
    match self.try_document(params).await {
      Ok(artifact) => GenerationOutcome::success(
        format!("Documentation written to {}", artifact.path.display()),
        artifact.path,
      ),
      Err(e) => failure("Documentation", e),
    }
  }

  pub async fn try_summarize(&self, turns: &[ConversationTurn]) -> Result<PathBuf, PipelineError> {
    conversation::summarize(&self.context(), turns).await
  }

  pub async fn run_summarize(&self, turns: &[ConversationTurn]) -> GenerationOutcome {
    match self.try_summarize(turns).await {
      Ok(path) => GenerationOutcome::success(format!("Conversation summary written to {}", path.display()), path),
      Err(e) => failure("Conversation summary", e),
    }
  }

  pub async fn reply(&self, question: &str) -> Result<String, PipelineError> {
    assistant::reply(&self.context(), question).await
  }
}

fn failure(pipeline: &str, e: PipelineError) -> GenerationOutcome {
  error!(pipeline, err = %e, "Pipeline failed");
  GenerationOutcome::failure(format!("{} failed: {}", pipeline, e))
}
