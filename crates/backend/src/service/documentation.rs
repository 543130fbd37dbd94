//! Technical documentation for a piece of source code.

use docsmith_core::Language;
use llm::{
  generate_structured,
  prompts::{DOCUMENT_SCHEMA, build_documentation_prompt},
};
use render::{OutputTarget, RenderedArtifact};
use serde_json::Value;
use tracing::{debug, info};

use super::SynthesisContext;
use crate::PipelineError;

/// Parameters for a documentation run.
#[derive(Debug, Clone)]
pub struct DocumentParams {
  pub code: String,
  pub language: Language,
  /// Artifact file name; the configured documentation filename when absent
  pub output_name: Option<String>,
}

impl DocumentParams {
  pub fn new(code: impl Into<String>, language: Language) -> Self {
    Self {
      code: code.into(),
      language,
      output_name: None,
    }
  }

  pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
    self.output_name = Some(name.into());
    self
  }
}

/// Best practices for the prompt: retrieved when possible, configured otherwise
pub async fn best_practices(ctx: &SynthesisContext<'_>) -> String {
  let retrieval = &ctx.config.retrieval;
  match ctx
    .context(&retrieval.best_practices_query, retrieval.context_matches, "\n")
    .await
  {
    Some(text) => text,
    None => {
      debug!("Using configured best practices");
      ctx.config.documentation.best_practices_text()
    }
  }
}

/// Analyze `params.code`, generate documentation for it and render the result.
///
/// Blank code and unusable artifact names are rejected before any generative call.
pub async fn generate(ctx: &SynthesisContext<'_>, params: DocumentParams) -> Result<RenderedArtifact, PipelineError> {
  if params.code.trim().is_empty() {
    return Err(PipelineError::EmptyInput("no code was provided"));
  }

  let target = OutputTarget::Static(
    params
      .output_name
      .unwrap_or_else(|| ctx.config.documentation.output_filename.clone()),
  );
  target.validate()?;

  let report = parser::analyze(&params.code, &params.language);
  debug!(language = %params.language, error = report.is_error(), "Analyzed source");

  let practices = best_practices(ctx).await;
  let request = ctx
    .request(build_documentation_prompt(&report, &practices))
    .with_schema(DOCUMENT_SCHEMA);

  let value: Value = generate_structured(ctx.provider, request).await?;

  let artifact = ctx.renderer.render_value(&value, &target)?;

  info!(
    path = %artifact.path.display(),
    coerced_sections = artifact.notes.len(),
    "Documentation generated"
  );
  Ok(artifact)
}
