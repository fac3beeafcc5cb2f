//! Configuration for the scheduler and the status reporters.
//!
//! Settings come from three layers, later layers winning:
//! 1. Built-in defaults (`common::constants`)
//! 2. `nightshade.toml` in `$XDG_CONFIG_HOME/nightshade/` (or the `--config` directory)
//! 3. `NIGHTSHADE_*` environment variables
//!
//! The file is optional. A missing file simply means defaults, so the status
//! reporters work on a fresh system without any setup.
//!
//! ```toml
//! #[Schedule]
//! enable_time = "20:00"            # Daily time the toggle command runs (HH:MM)
//! disable_time = "07:00"           # Optional: force daylight at this time (HH:MM)
//!
//! #[Commands]
//! toggle_command = ["~/.config/hypr/scripts/nightlight-toggle.sh"]
//! daemon = "hyprsunset"            # Process name checked at scheduler startup
//! daemon_command = ["hyprsunset"]  # How to start it when missing
//! set_temperature_command = ["hyprctl", "hyprsunset", "temperature"]
//! daylight_temp = 6500             # Applied at disable_time (1000-20000) Kelvin
//! command_timeout_ms = 2000        # Upper bound for every external command
//!
//! #[Status]
//! off_threshold = 6000             # Temperatures at or above this read as OFF
//! query_json_command = ["hyprctl", "-j", "hyprsunset", "temperature"]
//! query_temperature_command = ["hyprctl", "hyprsunset", "temperature"]
//! query_text_command = ["hyprctl", "hyprsunset"]
//!
//! #[Idle lock]
//! idle_daemon = "hypridle"
//! idle_settle_attempts = 3
//! idle_settle_delay_ms = 100
//!
//! #[Logging]
//! log_file = "~/.local/state/nightshade/nightshade.log"
//! ```

pub mod loading;
pub mod validation;


use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::constants::*;
use crate::common::utils::expand_tilde;
use crate::schedule::{ActivationTime, Schedule};

pub use loading::{
    apply_env_overrides, apply_overrides_from, get_config_path, get_custom_config_dir, load,
    load_from_path, set_config_dir,
};

/// Configuration structure for nightshade.
///
/// Every field is optional; accessor methods resolve the effective value with
/// the documented default. Construct once at startup and pass it to the entry
/// point that needs it.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Daily time at which the toggle command runs.
    pub enable_time: Option<String>,
    /// Optional daily time at which the daemon is forced to daylight.
    pub disable_time: Option<String>,

    /// Executable (and arguments) that toggles the nightlight.
    pub toggle_command: Option<Vec<String>>,
    /// Process name of the color temperature daemon.
    pub daemon: Option<String>,
    /// Command used to start the daemon when it is not running.
    pub daemon_command: Option<Vec<String>>,
    /// Command that sets a temperature; the Kelvin value is appended.
    pub set_temperature_command: Option<Vec<String>>,
    /// Temperature forced at the disable time.
    pub daylight_temp: Option<u32>,
    /// Upper bound for every external command, in milliseconds.
    pub command_timeout_ms: Option<u64>,

    /// Temperatures at or above this are reported as OFF.
    pub off_threshold: Option<u32>,
    pub query_json_command: Option<Vec<String>>,
    pub query_temperature_command: Option<Vec<String>>,
    pub query_text_command: Option<Vec<String>>,

    /// Process name of the idle-lock daemon.
    pub idle_daemon: Option<String>,
    pub idle_settle_attempts: Option<u32>,
    pub idle_settle_delay_ms: Option<u64>,

    /// Scheduler log file. A leading `~` is expanded.
    pub log_file: Option<String>,
}

fn owned(argv: &[&str]) -> Vec<String> {
    argv.iter().map(|s| s.to_string()).collect()
}

/// Expand `~` in the program position only; arguments are passed through untouched.
fn expand_program(mut argv: Vec<String>) -> Vec<String> {
    if let Some(program) = argv.first_mut() {
        *program = expand_tilde(program).to_string_lossy().into_owned();
    }
    argv
}

impl Config {
    /// Load configuration using automatic path detection.
    pub fn load() -> Result<Self> {
        loading::load()
    }

    pub fn enable_time(&self) -> Result<ActivationTime> {
        ActivationTime::parse(self.enable_time.as_deref().unwrap_or(DEFAULT_ENABLE_TIME))
    }

    pub fn disable_time(&self) -> Result<Option<ActivationTime>> {
        self.disable_time
            .as_deref()
            .map(ActivationTime::parse)
            .transpose()
    }

    /// The daily schedule built from the enable and disable times.
    pub fn schedule(&self) -> Result<Schedule> {
        Ok(Schedule::new(self.enable_time()?, self.disable_time()?))
    }

    pub fn toggle_command(&self) -> Vec<String> {
        expand_program(
            self.toggle_command
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_TOGGLE_COMMAND)),
        )
    }

    pub fn daemon(&self) -> &str {
        self.daemon.as_deref().unwrap_or(DEFAULT_DAEMON)
    }

    pub fn daemon_command(&self) -> Vec<String> {
        expand_program(
            self.daemon_command
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_DAEMON_COMMAND)),
        )
    }

    /// The full argv that forces `temperature`.
    pub fn set_temperature_command(&self, temperature: u32) -> Vec<String> {
        let mut argv = expand_program(
            self.set_temperature_command
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_SET_TEMPERATURE_COMMAND)),
        );
        argv.push(temperature.to_string());
        argv
    }

    pub fn daylight_temp(&self) -> u32 {
        self.daylight_temp.unwrap_or(DEFAULT_DAYLIGHT_TEMP)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(
            self.command_timeout_ms
                .unwrap_or(DEFAULT_COMMAND_TIMEOUT_MS),
        )
    }

    pub fn off_threshold(&self) -> u32 {
        self.off_threshold.unwrap_or(DEFAULT_OFF_THRESHOLD)
    }

    pub fn query_json_command(&self) -> Vec<String> {
        expand_program(
            self.query_json_command
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_QUERY_JSON_COMMAND)),
        )
    }

    pub fn query_temperature_command(&self) -> Vec<String> {
        expand_program(
            self.query_temperature_command
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_QUERY_TEMPERATURE_COMMAND)),
        )
    }

    pub fn query_text_command(&self) -> Vec<String> {
        expand_program(
            self.query_text_command
                .clone()
                .unwrap_or_else(|| owned(DEFAULT_QUERY_TEXT_COMMAND)),
        )
    }

    pub fn idle_daemon(&self) -> &str {
        self.idle_daemon.as_deref().unwrap_or(DEFAULT_IDLE_DAEMON)
    }

    pub fn idle_settle_attempts(&self) -> u32 {
        self.idle_settle_attempts
            .unwrap_or(DEFAULT_IDLE_SETTLE_ATTEMPTS)
    }

    pub fn idle_settle_delay(&self) -> Duration {
        Duration::from_millis(
            self.idle_settle_delay_ms
                .unwrap_or(DEFAULT_IDLE_SETTLE_DELAY_MS),
        )
    }

    /// Resolved scheduler log file path.
    ///
    /// Defaults to `$XDG_STATE_HOME/nightshade/nightshade.log`, falling back to
    /// `~/.local/state` and finally the temp directory.
    pub fn log_file_path(&self) -> PathBuf {
        if let Some(path) = self.log_file.as_deref() {
            return expand_tilde(path);
        }
        dirs::state_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("state")))
            .unwrap_or_else(std::env::temp_dir)
            .join(CONFIG_DIR_NAME)
            .join(LOG_FILE_NAME)
    }

    /// Log the effective configuration for the scheduler.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        match self.enable_time() {
            Ok(time) => log_indented!("Enable time: {time}"),
            Err(_) => log_indented!("Enable time: invalid"),
        }
        if let Ok(Some(time)) = self.disable_time() {
            log_indented!("Disable time: {time} ({}K)", self.daylight_temp());
        }
        log_indented!(
            "Toggle command: {}",
            crate::common::utils::display_command(&self.toggle_command())
        );
        log_indented!("Daemon: {}", self.daemon());
        log_indented!("Command timeout: {}ms", self.command_timeout().as_millis());
    }
}
