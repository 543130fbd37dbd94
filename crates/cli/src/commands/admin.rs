//! Configuration commands

use std::path::Path;

use anyhow::{Context, Result};
use docsmith::config::Config;
use tracing::error;

/// Show the effective configuration for a project
pub fn cmd_config_show(project: &Path, config: &Config) -> Result<()> {
  let project_config = Config::project_config_path(project);
  let user_config = Config::user_config_path();

  println!("Effective configuration for: {:?}", project);
  println!();

  if project_config.exists() {
    println!("Using project config: {:?}", project_config);
  } else if let Some(ref user_path) = user_config
    && user_path.exists()
  {
    println!("Using user config: {:?}", user_path);
  } else {
    println!("Using default configuration (no config file found)");
  }
  println!();

  let toml_str = toml::to_string_pretty(config).context("Failed to serialize config")?;
  println!("{}", toml_str);

  Ok(())
}

/// Write a commented config template into the project
pub fn cmd_config_init(project: &Path, force: bool) -> Result<()> {
  let config_path = Config::project_config_path(project);

  if config_path.exists() && !force {
    error!("Config file already exists: {:?}", config_path);
    println!("Use --force to overwrite it");
    std::process::exit(1);
  }

  if let Some(parent) = config_path.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
  }
  std::fs::write(&config_path, Config::generate_template())
    .with_context(|| format!("Failed to write {:?}", config_path))?;

  println!("Created project config: {:?}", config_path);
  println!("Edit the file to customize settings.");

  Ok(())
}
