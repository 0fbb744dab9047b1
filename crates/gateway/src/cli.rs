//! Command-line surface of the `cadena` binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use cadena_domain::config::Config;

#[derive(Parser)]
#[command(name = "cadena", about = "Stateful turn orchestrator for a messaging business assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the orchestrator (default).
    Serve,
    /// Configuration helpers.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the version.
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Validate the configuration and exit non-zero on errors.
    Validate,
    /// Print the effective configuration as TOML.
    Show,
}

/// Load the configuration from `CADENA_CONFIG` or `./cadena.toml`.
/// A missing file yields the built-in defaults; validation then fails
/// until lanes are configured.
pub fn load_config() -> anyhow::Result<(Config, PathBuf)> {
    let path = std::env::var("CADENA_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("cadena.toml"));
    let config = load_config_from(&path)?;
    Ok((config, path))
}

/// Load and parse one specific config file.
pub fn load_config_from(path: &std::path::Path) -> anyhow::Result<Config> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "config file not found, using built-in defaults");
        return Ok(Config::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Print validation results; returns `false` when any issue is fatal.
pub fn validate(config: &Config, path: &std::path::Path) -> bool {
    let issues = config.validate();
    if issues.is_empty() {
        println!("{}: configuration OK", path.display());
        return true;
    }
    for issue in &issues {
        println!("{issue}");
    }
    !Config::has_errors(&issues)
}

/// Print the effective configuration as TOML.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("failed to render config: {e}"),
    }
}
