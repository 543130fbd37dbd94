//! Configuration system for docsmith with per-project overrides.
//!
//! Config priority: project-relative (.docsmith/config.toml) > user (~/.config/docsmith/config.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Generative Model Configuration
// ============================================================================

/// Settings for the generative model collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
  /// Model passed to the provider (e.g., "haiku", "sonnet")
  pub model: String,

  /// Per-call timeout in seconds
  pub timeout_secs: u64,
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      model: "haiku".to_string(),
      timeout_secs: 120,
    }
  }
}

// ============================================================================
// Embedding Configuration
// ============================================================================

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
  /// Model name (e.g., "qwen3-embedding", "nomic-embed-text")
  pub model: String,

  /// Embedding dimensions (must match model output)
  pub dimensions: usize,

  /// Ollama server URL
  pub ollama_url: String,

  /// Maximum number of texts per embedding request
  pub max_batch_size: usize,
}

impl Default for EmbeddingConfig {
  fn default() -> Self {
    Self {
      model: "qwen3-embedding".to_string(),
      dimensions: 4096,
      ollama_url: "http://localhost:11434".to_string(),
      max_batch_size: 32,
    }
  }
}

// ============================================================================
// Retrieval Configuration
// ============================================================================

/// Knowledge base retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
  /// Root directory of the knowledge base corpus
  pub knowledge_base: PathBuf,

  /// File extensions loaded from the corpus (without the dot)
  pub extensions: Vec<String>,

  /// Chunk size in characters
  pub chunk_size: usize,

  /// Characters shared between consecutive chunks
  pub chunk_overlap: usize,

  /// Number of matches returned per query
  pub top_k: usize,

  /// Prefix length returned by lexical search when nothing matches
  pub fallback_prefix_chars: usize,

  /// Query used to look up documentation best practices
  pub best_practices_query: String,

  /// Number of matches joined into the documentation prompt
  pub context_matches: usize,
}

impl Default for RetrievalConfig {
  fn default() -> Self {
    Self {
      knowledge_base: PathBuf::from("knowledge_base"),
      extensions: vec!["txt".to_string()],
      chunk_size: 1000,
      chunk_overlap: 200,
      top_k: 3,
      fallback_prefix_chars: 1000,
      best_practices_query: "python documentation best practices".to_string(),
      context_matches: 2,
    }
  }
}

// ============================================================================
// Documentation Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
  /// Language assumed when none is given
  pub default_language: String,

  /// Used as prompt context when retrieval yields nothing
  pub best_practices: Vec<String>,

  /// Artifact filename for generated documentation
  pub output_filename: String,
}

impl Default for DocumentationConfig {
  fn default() -> Self {
    Self {
      default_language: "python".to_string(),
      best_practices: vec![
        "Use PEP 257 style docstrings".to_string(),
        "Include type hints".to_string(),
        "Document parameters and return values".to_string(),
      ],
      output_filename: "technical_documentation.html".to_string(),
    }
  }
}

impl DocumentationConfig {
  /// Static best practices as a bullet list
  pub fn best_practices_text(&self) -> String {
    self
      .best_practices
      .iter()
      .map(|p| format!("- {}", p))
      .collect::<Vec<_>>()
      .join("\n")
  }
}

// ============================================================================
// Output Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
  /// Directory where artifacts are written (created if absent)
  pub directory: PathBuf,

  /// Estimated text lines per rendered page
  pub lines_per_page: usize,
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      directory: PathBuf::from("data"),
      lines_per_page: 48,
    }
  }
}

// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Log level (error, warn, info, debug, trace)
  pub level: String,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
    }
  }
}

// ============================================================================
// Root Configuration
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub llm: LlmConfig,

  #[serde(default)]
  pub embedding: EmbeddingConfig,

  #[serde(default)]
  pub retrieval: RetrievalConfig,

  #[serde(default)]
  pub documentation: DocumentationConfig,

  #[serde(default)]
  pub output: OutputConfig,

  #[serde(default)]
  pub logging: LoggingConfig,
}

impl Config {
  /// Load config for a project, with fallback to user config
  pub fn load_for_project(project_path: &Path) -> Self {
    // Try project-relative first
    let project_config = Self::project_config_path(project_path);
    if project_config.exists()
      && let Ok(content) = std::fs::read_to_string(&project_config)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }

    // Fall back to user config
    if let Some(user_config_path) = Self::user_config_path()
      && user_config_path.exists()
      && let Ok(content) = std::fs::read_to_string(&user_config_path)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }

    Self::default()
  }

  /// Get the user-level config path
  pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CONFIG_DIR") {
      return Some(PathBuf::from(path).join("config.toml"));
    }

    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
      return Some(PathBuf::from(path).join("docsmith").join("config.toml"));
    }

    dirs::config_dir().map(|p: PathBuf| p.join("docsmith").join("config.toml"))
  }

  /// Get the project-relative config path
  pub fn project_config_path(project_path: &Path) -> PathBuf {
    project_path.join(".docsmith").join("config.toml")
  }

  /// Resolve relative corpus and output paths against a project root
  pub fn resolve_paths(mut self, project_path: &Path) -> Self {
    if self.retrieval.knowledge_base.is_relative() {
      self.retrieval.knowledge_base = project_path.join(&self.retrieval.knowledge_base);
    }
    if self.output.directory.is_relative() {
      self.output.directory = project_path.join(&self.output.directory);
    }
    self
  }

  /// Generate a default config file as a string
  pub fn generate_template() -> String {
    r#"# docsmith configuration
# Place in .docsmith/config.toml (project) or ~/.config/docsmith/config.toml (user)

# ============================================================================
# Generative Model
# ============================================================================

[llm]
# Model passed to the claude CLI
model = "haiku"

# Per-call timeout (seconds)
timeout_secs = 120

# ============================================================================
# Embedding Provider (Ollama)
# ============================================================================

[embedding]
model = "qwen3-embedding"

# Embedding dimensions (must match model output)
dimensions = 4096

ollama_url = "http://localhost:11434"

# Texts per embedding request
max_batch_size = 32

# ============================================================================
# Knowledge Base Retrieval
# ============================================================================

[retrieval]
# Corpus root, searched recursively
knowledge_base = "knowledge_base"
extensions = ["txt"]

# Chunking (characters)
chunk_size = 1000
chunk_overlap = 200

# Matches per query
top_k = 3

# Prefix returned by lexical search when no document matches
fallback_prefix_chars = 1000

best_practices_query = "python documentation best practices"
context_matches = 2

# ============================================================================
# Documentation
# ============================================================================

[documentation]
default_language = "python"
output_filename = "technical_documentation.html"

# Used when the knowledge base is unavailable
best_practices = [
    "Use PEP 257 style docstrings",
    "Include type hints",
    "Document parameters and return values",
]

# ============================================================================
# Output
# ============================================================================

[output]
directory = "data"
lines_per_page = 48

# ============================================================================
# Logging
# ============================================================================

[logging]
# error, warn, info, debug, trace (RUST_LOG overrides)
level = "info"
"#
    .to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.retrieval.chunk_size, 1000);
    assert_eq!(config.retrieval.chunk_overlap, 200);
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.output.directory, PathBuf::from("data"));
    assert_eq!(config.documentation.best_practices.len(), 3);
  }

  #[test]
  fn test_partial_toml_uses_defaults() {
    let toml_content = r#"
[retrieval]
top_k = 5

[documentation]
best_practices = ["Keep functions small"]
"#;
    let config: Config = toml::from_str(toml_content).unwrap();
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.retrieval.chunk_size, 1000);
    assert_eq!(config.documentation.best_practices_text(), "- Keep functions small");
    assert_eq!(config.llm.model, "haiku");
  }

  #[test]
  fn test_template_parses() {
    let config: Config = toml::from_str(&Config::generate_template()).unwrap();
    assert_eq!(config.output.lines_per_page, 48);
    assert_eq!(config.retrieval.extensions, vec!["txt".to_string()]);
  }

  #[test]
  fn test_load_for_project_prefers_project_file() {
    let dir = TempDir::new().unwrap();
    let path = Config::project_config_path(dir.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[output]\ndirectory = \"artifacts\"\n").unwrap();

    let config = Config::load_for_project(dir.path());
    assert_eq!(config.output.directory, PathBuf::from("artifacts"));
  }

  #[test]
  fn test_resolve_paths() {
    let config = Config::default().resolve_paths(Path::new("/project"));
    assert_eq!(config.retrieval.knowledge_base, PathBuf::from("/project/knowledge_base"));
    assert_eq!(config.output.directory, PathBuf::from("/project/data"));
  }
}
