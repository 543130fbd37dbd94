//! Commands that call the generative model (document, summarize, ask)

use anyhow::{Context, Result};
use docsmith::{DocumentParams, Docsmith, config::Config, parse_transcript};
use docsmith_core::{GenerationOutcome, Language};
use tracing::error;

use super::{read_input, resolve_language};

fn report(outcome: &GenerationOutcome, json_output: bool) -> Result<()> {
  if json_output {
    println!("{}", serde_json::to_string_pretty(outcome)?);
  } else if outcome.is_success() {
    println!("{}", outcome.message);
  }

  if !outcome.is_success() {
    error!("{}", outcome.message);
    std::process::exit(1);
  }
  Ok(())
}

/// Generate technical documentation for a source file
pub async fn cmd_document(
  config: Config,
  file: &str,
  language: Option<&str>,
  output: Option<&str>,
  json_output: bool,
) -> Result<()> {
  let code = read_input(file)?;
  let language: Language = resolve_language(file, language, &config.documentation.default_language);

  let docsmith = Docsmith::from_config(config).context("Failed to set up pipelines")?;

  let mut params = DocumentParams::new(code, language);
  if let Some(name) = output {
    params = params.with_output_name(name);
  }

  report(&docsmith.run_document(params).await, json_output)
}

/// Summarize a JSON transcript into a document
pub async fn cmd_summarize(config: Config, transcript: &str, json_output: bool) -> Result<()> {
  let raw = read_input(transcript)?;
  let turns = parse_transcript(&raw).with_context(|| format!("Invalid transcript JSON in {}", transcript))?;

  let docsmith = Docsmith::from_config(config).context("Failed to set up pipelines")?;
  report(&docsmith.run_summarize(&turns).await, json_output)
}

/// Ask the assistant a question
pub async fn cmd_ask(config: Config, question: &str) -> Result<()> {
  let docsmith = Docsmith::from_config(config).context("Failed to set up pipelines")?;

  match docsmith.reply(question).await {
    Ok(answer) => println!("{}", answer),
    Err(e) => {
      error!("{}", e);
      std::process::exit(1);
    }
  }
  Ok(())
}
