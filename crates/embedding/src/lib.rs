//! Embedding providers used to index the knowledge base corpus

mod ollama;
mod provider;

pub use ollama::OllamaProvider;
pub use provider::{EmbeddingError, EmbeddingProvider};
