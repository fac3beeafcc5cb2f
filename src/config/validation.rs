//! Configuration validation functionality.
//!
//! Rejects settings that would make the scheduler misfire or the reporters
//! misclassify: unparseable times, identical enable and disable times, empty
//! commands and out-of-range values.

use anyhow::{Context, Result};

use super::Config;
use crate::common::constants::*;
use crate::schedule::ActivationTime;

/// Validate a configuration, returning the first problem found.
pub fn validate_config(config: &Config) -> Result<()> {
    let enable = config.enable_time().context("enable_time is invalid")?;
    let disable = config.disable_time().context("disable_time is invalid")?;

    if let Some(disable) = disable {
        validate_distinct_times(enable, disable)?;
    }

    validate_command("toggle_command", config.toggle_command.as_deref())?;
    validate_command("daemon_command", config.daemon_command.as_deref())?;
    validate_command(
        "set_temperature_command",
        config.set_temperature_command.as_deref(),
    )?;
    validate_command("query_json_command", config.query_json_command.as_deref())?;
    validate_command(
        "query_temperature_command",
        config.query_temperature_command.as_deref(),
    )?;
    validate_command("query_text_command", config.query_text_command.as_deref())?;

    if let Some(name) = config.daemon.as_deref()
        && name.trim().is_empty()
    {
        anyhow::bail!("daemon must not be empty");
    }
    if let Some(name) = config.idle_daemon.as_deref()
        && name.trim().is_empty()
    {
        anyhow::bail!("idle_daemon must not be empty");
    }

    if let Some(threshold) = config.off_threshold {
        validate_temperature("off_threshold", threshold)?;
    }
    if let Some(temp) = config.daylight_temp {
        validate_temperature("daylight_temp", temp)?;
    }

    if let Some(timeout) = config.command_timeout_ms
        && !(MINIMUM_COMMAND_TIMEOUT_MS..=MAXIMUM_COMMAND_TIMEOUT_MS).contains(&timeout)
    {
        anyhow::bail!(
            "command_timeout_ms ({}) must be between {} and {} milliseconds",
            timeout,
            MINIMUM_COMMAND_TIMEOUT_MS,
            MAXIMUM_COMMAND_TIMEOUT_MS
        );
    }

    if let Some(attempts) = config.idle_settle_attempts
        && attempts > MAXIMUM_IDLE_SETTLE_ATTEMPTS
    {
        anyhow::bail!(
            "idle_settle_attempts ({}) must be at most {}",
            attempts,
            MAXIMUM_IDLE_SETTLE_ATTEMPTS
        );
    }
    if let Some(delay) = config.idle_settle_delay_ms
        && delay > MAXIMUM_IDLE_SETTLE_DELAY_MS
    {
        anyhow::bail!(
            "idle_settle_delay_ms ({}) must be at most {} milliseconds",
            delay,
            MAXIMUM_IDLE_SETTLE_DELAY_MS
        );
    }

    if let Some(path) = config.log_file.as_deref()
        && path.trim().is_empty()
    {
        anyhow::bail!("log_file must not be empty");
    }

    Ok(())
}

fn validate_distinct_times(enable: ActivationTime, disable: ActivationTime) -> Result<()> {
    if enable == disable {
        anyhow::bail!(
            "enable_time and disable_time are both {enable}; the nightlight would be toggled and reset at the same moment"
        );
    }
    Ok(())
}

fn validate_command(field: &str, argv: Option<&[String]>) -> Result<()> {
    if let Some(argv) = argv {
        match argv.first() {
            None => anyhow::bail!("{field} must contain at least the program to run"),
            Some(program) if program.trim().is_empty() => {
                anyhow::bail!("{field} has an empty program name")
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn validate_temperature(field: &str, temp: u32) -> Result<()> {
    if !(MINIMUM_TEMP..=MAXIMUM_TEMP).contains(&temp) {
        anyhow::bail!(
            "{} ({}) must be between {} and {} Kelvin",
            field,
            temp,
            MINIMUM_TEMP,
            MAXIMUM_TEMP
        );
    }
    Ok(())
}
