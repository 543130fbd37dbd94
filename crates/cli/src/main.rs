//! docsmith CLI - documentation and conversation summaries from code and chats

use anyhow::Result;
use clap::{Parser, Subcommand};
use docsmith::config::Config;
use std::path::PathBuf;

mod commands;
mod logging;

use commands::{cmd_analyze, cmd_ask, cmd_config_init, cmd_config_show, cmd_document, cmd_search, cmd_summarize};
use logging::init_cli_logging;

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(about = "Generate technical documentation and conversation summaries")]
#[command(after_help = "\
QUICK START:
  docsmith config init              # Create .docsmith/config.toml
  docsmith document src/module.py   # Document a source file
  docsmith summarize chat.json      # Summarize a transcript
  docsmith ask \"how should I name tests?\"

REQUIREMENTS:
  The claude CLI on PATH for generation; Ollama for semantic search
  (keyword search is used when Ollama is unavailable)")]
struct Cli {
  /// Project directory (default: current directory)
  #[arg(short, long, global = true)]
  project: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

/// Subcommands for `docsmith config`
#[derive(Subcommand)]
pub enum ConfigCommand {
  /// Show current effective configuration
  #[command(long_about = "Show the current effective configuration.\n\n\
    Displays which config file is being used and its contents as TOML.")]
  Show,

  /// Initialize project config file (.docsmith/config.toml)
  Init {
    /// Overwrite an existing config file
    #[arg(long)]
    force: bool,
  },
}

#[derive(Subcommand)]
enum Commands {
  /// Generate technical documentation for a source file
  #[command(after_help = "\
EXAMPLES:
  docsmith document calc.py
  docsmith document - --language python < calc.py
  docsmith document calc.py --output calc_docs.html")]
  Document {
    /// Source file, or - for stdin
    file: String,
    /// Source language (default: from extension, then config)
    #[arg(short, long)]
    language: Option<String>,
    /// Artifact file name inside the output directory
    #[arg(short, long)]
    output: Option<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
  /// Summarize a JSON conversation transcript into a document
  #[command(after_help = "\
TRANSCRIPT FORMAT:
  [{\"role\": \"user\", \"content\": \"...\"}, {\"role\": \"assistant\", \"content\": \"...\"}]
  or [[\"user message\", \"assistant reply\"], ...]")]
  Summarize {
    /// Transcript file, or - for stdin
    transcript: String,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
  /// Ask the documentation assistant a question
  Ask {
    /// The question
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,
  },
  /// Print the structural analysis of a source file
  Analyze {
    /// Source file, or - for stdin
    file: String,
    /// Source language (default: from extension, then config)
    #[arg(short, long)]
    language: Option<String>,
  },
  /// Search the knowledge base
  Search {
    /// Search query
    query: String,
    #[arg(short, long)]
    limit: Option<usize>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
  /// Manage configuration
  #[command(after_help = "\
CONFIG LOCATIONS:
  Project: .docsmith/config.toml
  User:    ~/.config/docsmith/config.toml")]
  Config {
    #[command(subcommand)]
    command: ConfigCommand,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let project = cli
    .project
    .or_else(|| std::env::current_dir().ok())
    .unwrap_or_else(|| PathBuf::from("."));
  let config = Config::load_for_project(&project).resolve_paths(&project);

  init_cli_logging(&config.logging.level);

  match cli.command {
    Commands::Document {
      file,
      language,
      output,
      json,
    } => cmd_document(config, &file, language.as_deref(), output.as_deref(), json).await,
    Commands::Summarize { transcript, json } => cmd_summarize(config, &transcript, json).await,
    Commands::Ask { question } => cmd_ask(config, &question.join(" ")).await,
    Commands::Analyze { file, language } => cmd_analyze(&config, &file, language.as_deref()),
    Commands::Search { query, limit, json } => cmd_search(config, &query, limit, json).await,

    Commands::Config { command } => match command {
      ConfigCommand::Show => cmd_config_show(&project, &config),
      ConfigCommand::Init { force } => cmd_config_init(&project, force),
    },
  }
}
