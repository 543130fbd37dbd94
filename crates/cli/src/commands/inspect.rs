//! Commands that never call the generative model (analyze, search)

use std::sync::Arc;

use anyhow::{Context, Result};
use docsmith::config::Config;
use embedding::OllamaProvider;
use index::{IndexedRetriever, KnowledgeRetriever};
use tracing::error;

use super::{read_input, resolve_language};

const PREVIEW_CHARS: usize = 200;

/// Print the structural analysis of a source file as JSON
pub fn cmd_analyze(config: &Config, file: &str, language: Option<&str>) -> Result<()> {
  let code = read_input(file)?;
  let language = resolve_language(file, language, &config.documentation.default_language);

  let report = parser::analyze(&code, &language);
  println!("{}", serde_json::to_string_pretty(&report)?);
  Ok(())
}

/// Query the knowledge base
pub async fn cmd_search(config: Config, query: &str, limit: Option<usize>, json_output: bool) -> Result<()> {
  let embedder = Arc::new(OllamaProvider::from_config(&config.embedding));
  let retriever = IndexedRetriever::new(config.retrieval.clone(), embedder);

  let mut results = match retriever.query(query).await {
    Ok(results) => results,
    Err(e) => {
      error!("Search error: {}", e);
      std::process::exit(1);
    }
  };
  if let Some(limit) = limit {
    results.truncate(limit);
  }

  if json_output {
    println!("{}", serde_json::to_string_pretty(&results).context("Failed to serialize results")?);
    return Ok(());
  }

  if results.is_empty() {
    println!("No matches found for: {}", query);
    return Ok(());
  }

  println!("Found {} matches:\n", results.len());
  for (i, chunk) in results.iter().enumerate() {
    println!("{}. {} (chunk {})", i + 1, chunk.metadata.source, chunk.metadata.chunk_index);
    let preview: String = chunk.content.chars().take(PREVIEW_CHARS).collect();
    let ellipsis = if chunk.content.chars().count() > PREVIEW_CHARS { "..." } else { "" };
    println!("   {}{}", preview.replace('\n', "\n   "), ellipsis);
    println!("   Score: {:.2}", chunk.score);
    println!();
  }

  if !retriever.is_indexed() {
    println!("Note: embeddings were unavailable, results are from keyword search.");
  }

  Ok(())
}
