// Configuration management module
// TOML settings file plus environment overrides

pub mod settings;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};

pub use settings::{
    AttributionConfig, Config, ConfigError, GenerationConfig, MemoryConfig, OllamaConfig,
    ServerConfig, VectorStoreConfig,
};

/// Render the effective configuration as TOML
#[inline]
pub fn render_config(config: &Config) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to serialize config to TOML")
}

/// Write `config.toml` from the file's own values (or defaults) without
/// environment overrides, returning the written path
#[inline]
pub fn write_config<P: AsRef<Path>>(config_dir: P) -> Result<PathBuf> {
    let config = Config::load_file(config_dir)?;
    config.save()?;
    Ok(config.config_file_path())
}

#[inline]
pub fn show_config(config: &Config) -> Result<()> {
    eprintln!("{}", style("Cooking Assistant Configuration").bold().cyan());
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).cyan()
    );
    eprintln!(
        "Generation API key: {}",
        if config.generation.api_key.is_some() {
            style("set").green()
        } else {
            style("missing (set GOOGLE_API_KEY)").yellow()
        }
    );
    eprintln!();
    println!("{}", render_config(config)?);
    Ok(())
}
