//! Config command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use voozaa_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config = Config::load_with_override(config_path.map(PathBuf::as_path))
        .context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "storage_key": config.storage_key,
                    "seed_sample_data": config.seed_sample_data,
                    "log_file": config.log_file,
                    "state_file": config.state_path(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.state_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:         {}", config.data_dir.display());
            println!("  storage_key:      {}", config.storage_key);
            println!("  seed_sample_data: {}", config.seed_sample_data);
            println!(
                "  log_file:         {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
            println!("State file:  {}", config.state_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config = Config::load_with_override(config_path.map(PathBuf::as_path))
        .context("Failed to load configuration")?;

    let stored = if value == "none" { "" } else { value.as_str() };
    config.set(&key, stored)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
