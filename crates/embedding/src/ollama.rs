use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use docsmith_core::config::EmbeddingConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::{EmbeddingError, EmbeddingProvider};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "qwen3-embedding";
const DEFAULT_DIMENSIONS: usize = 4096;
const DEFAULT_MAX_BATCH_SIZE: usize = 32;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// the gpu is the bottleneck, more than this just queues on the server
const MAX_CONCURRENT_REQUESTS: usize = 4;

#[derive(Debug, Clone)]
pub struct OllamaProvider {
  client: reqwest::Client,
  base_url: String,
  model: String,
  dimensions: usize,
  max_batch_size: usize,
}

impl Default for OllamaProvider {
  fn default() -> Self {
    Self::new()
  }
}

impl OllamaProvider {
  pub fn new() -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: DEFAULT_OLLAMA_URL.to_string(),
      model: DEFAULT_MODEL.to_string(),
      dimensions: DEFAULT_DIMENSIONS,
      max_batch_size: DEFAULT_MAX_BATCH_SIZE,
    }
  }

  pub fn from_config(config: &EmbeddingConfig) -> Self {
    info!(
      base_url = %config.ollama_url,
      model = %config.model,
      dimensions = config.dimensions,
      max_batch_size = config.max_batch_size,
      "Ollama provider initialized"
    );
    Self::new()
      .with_url(&config.ollama_url)
      .with_model(&config.model, config.dimensions)
      .with_max_batch_size(config.max_batch_size)
  }

  pub fn with_url(mut self, url: impl Into<String>) -> Self {
    self.base_url = url.into().trim_end_matches('/').to_string();
    self
  }

  pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
    self.model = model.into();
    self.dimensions = dimensions;
    self
  }

  /// Set the maximum texts per request (at least 1)
  pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
    self.max_batch_size = max_batch_size.max(1);
    self
  }

  pub fn max_batch_size(&self) -> usize {
    self.max_batch_size
  }

  fn embed_url(&self) -> String {
    format!("{}/api/embed", self.base_url)
  }

  /// Embed a single sub-batch with one request
  async fn embed_single_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let request = BatchEmbeddingRequest {
      model: &self.model,
      input: texts.to_vec(),
    };

    debug!(batch_size = texts.len(), model = %self.model, "Embedding batch with Ollama");

    let response = self
      .client
      .post(self.embed_url())
      .timeout(REQUEST_TIMEOUT)
      .json(&request)
      .send()
      .await
      .map_err(|e| if e.is_timeout() { EmbeddingError::Timeout } else { e.into() })?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      warn!(%status, body = %body, "Ollama batch embedding failed");
      return Err(EmbeddingError::ProviderError(format!(
        "Ollama returned {}: {}",
        status, body
      )));
    }

    let result: BatchEmbeddingResponse = response.json().await?;

    if result.embeddings.len() != texts.len() {
      return Err(EmbeddingError::ProviderError(format!(
        "Batch size mismatch: got {} embeddings for {} inputs",
        result.embeddings.len(),
        texts.len()
      )));
    }

    if let Some(embedding) = result.embeddings.iter().find(|e| e.len() != self.dimensions) {
      warn!(
        got = embedding.len(),
        expected = self.dimensions,
        "Unexpected embedding dimensions"
      );
    }

    Ok(result.embeddings)
  }
}

/// Request for batch embedding (/api/embed endpoint)
#[derive(Debug, Serialize)]
struct BatchEmbeddingRequest<'a> {
  model: &'a str,
  input: Vec<&'a str>,
}

/// Response from batch embedding (/api/embed endpoint)
#[derive(Debug, Deserialize)]
struct BatchEmbeddingResponse {
  embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
  fn name(&self) -> &str {
    "ollama"
  }

  fn model_id(&self) -> &str {
    &self.model
  }

  fn dimensions(&self) -> usize {
    self.dimensions
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
    self
      .embed_single_batch(&[text])
      .await?
      .pop()
      .ok_or_else(|| EmbeddingError::ProviderError("Ollama returned no embedding".to_string()))
  }

  /// Splits into sub-batches and runs them with bounded concurrency, keeping input order
  async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if texts.is_empty() {
      return Ok(Vec::new());
    }

    let num_batches = texts.len().div_ceil(self.max_batch_size);
    if num_batches == 1 {
      return self.embed_single_batch(texts).await;
    }

    debug!(
      batch_size = texts.len(),
      sub_batches = num_batches,
      max_batch_size = self.max_batch_size,
      "Processing batch with concurrent sub-batches"
    );

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS));
    let futures: Vec<_> = texts
      .chunks(self.max_batch_size)
      .map(|chunk| {
        let semaphore = semaphore.clone();
        async move {
          let _permit = semaphore
            .acquire()
            .await
            .map_err(|_| EmbeddingError::ProviderError("semaphore closed".to_string()))?;
          self.embed_single_batch(chunk).await
        }
      })
      .collect();

    // join_all preserves the order of its inputs
    let mut all_embeddings = Vec::with_capacity(texts.len());
    for result in futures::future::join_all(futures).await {
      all_embeddings.extend(result?);
    }

    Ok(all_embeddings)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_provider_defaults() {
    let provider = OllamaProvider::new();
    assert_eq!(provider.name(), "ollama");
    assert_eq!(provider.model_id(), DEFAULT_MODEL);
    assert_eq!(provider.dimensions(), DEFAULT_DIMENSIONS);
  }

  #[test]
  fn test_provider_customization() {
    let provider = OllamaProvider::new()
      .with_url("http://custom:8080/")
      .with_model("custom-model", 1024)
      .with_max_batch_size(0);

    assert_eq!(provider.embed_url(), "http://custom:8080/api/embed");
    assert_eq!(provider.model_id(), "custom-model");
    assert_eq!(provider.dimensions(), 1024);
    assert_eq!(provider.max_batch_size(), 1);
  }

  #[test]
  fn test_from_config() {
    let config = EmbeddingConfig {
      model: "nomic-embed-text".to_string(),
      dimensions: 768,
      ollama_url: "http://gpu-box:11434".to_string(),
      max_batch_size: 8,
    };
    let provider = OllamaProvider::from_config(&config);
    assert_eq!(provider.model_id(), "nomic-embed-text");
    assert_eq!(provider.dimensions(), 768);
    assert_eq!(provider.max_batch_size(), 8);
    assert_eq!(provider.embed_url(), "http://gpu-box:11434/api/embed");
  }

  #[tokio::test]
  async fn test_embed_batch_empty_input() {
    let provider = OllamaProvider::new();
    // no network call needed
    let result = provider.embed_batch(&[]).await;
    assert!(result.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_unreachable_server_is_an_error() {
    let provider = OllamaProvider::new().with_url("http://127.0.0.1:1");
    assert!(provider.embed_batch(&["test"]).await.is_err());
  }
}
