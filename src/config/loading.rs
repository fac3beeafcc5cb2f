//! Configuration loading functionality.
//!
//! Locates `nightshade.toml`, parses it when present, layers `NIGHTSHADE_*`
//! environment overrides on top and validates the result.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::common::constants::*;
use crate::common::utils::private_path;

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Path of `nightshade.toml`, honoring a custom `--config` directory.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(dir) = get_custom_config_dir() {
        return Ok(dir.join(CONFIG_FILE_NAME));
    }

    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration using automatic path detection.
///
/// A missing file yields the defaults. Environment overrides are applied in
/// both cases before validation.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    let mut config = if config_path.exists() {
        parse_file(&config_path)?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config).with_context(|| {
        format!(
            "Invalid configuration (file: {})",
            private_path(&config_path)
        )
    })?;

    Ok(config)
}

/// Load configuration from a specific file without environment overrides.
///
/// Unlike `load`, a missing file is an error here.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file not found at {}",
            private_path(path)
        );
    }

    let config = parse_file(path)?;
    validate_config(&config)
        .with_context(|| format!("Invalid configuration in {}", private_path(path)))?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", private_path(path)))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", private_path(path)))
}

/// Apply `NIGHTSHADE_*` variables from the process environment.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary key lookup.
///
/// Empty values are ignored so that `NIGHTSHADE_DISABLE_TIME=` in a unit file
/// does not clobber the file setting. Command variables are split on whitespace.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(value) = get("NIGHTSHADE_ENABLE_TIME") {
        config.enable_time = Some(value.trim().to_string());
    }
    if let Some(value) = get("NIGHTSHADE_DISABLE_TIME") {
        config.disable_time = Some(value.trim().to_string());
    }
    if let Some(value) = get("NIGHTSHADE_TOGGLE_COMMAND") {
        config.toggle_command = Some(split_command(&value));
    }
    if let Some(value) = get("NIGHTSHADE_DAEMON") {
        config.daemon = Some(value.trim().to_string());
    }
    if let Some(value) = get("NIGHTSHADE_LOG_FILE") {
        config.log_file = Some(value.trim().to_string());
    }
    if let Some(value) = get("NIGHTSHADE_OFF_THRESHOLD") {
        config.off_threshold = Some(
            value
                .trim()
                .parse()
                .with_context(|| format!("NIGHTSHADE_OFF_THRESHOLD must be a number (got '{value}')"))?,
        );
    }
    if let Some(value) = get("NIGHTSHADE_COMMAND_TIMEOUT_MS") {
        config.command_timeout_ms = Some(value.trim().parse().with_context(|| {
            format!("NIGHTSHADE_COMMAND_TIMEOUT_MS must be a number (got '{value}')")
        })?);
    }

    Ok(())
}

fn split_command(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}
