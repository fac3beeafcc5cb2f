//! Application-wide constants: defaults, validation limits, exit codes and glyphs.
//!
//! Defaults here are what an unconfigured Hyprland desktop with hyprsunset and
//! hypridle expects. Every default can be overridden from `nightshade.toml` or
//! the matching `NIGHTSHADE_*` environment variable.

// # Schedule Defaults

/// Clock time at which the toggle command runs each day.
pub const DEFAULT_ENABLE_TIME: &str = "20:00";

// # Daemon Defaults

/// Process name of the color temperature daemon.
pub const DEFAULT_DAEMON: &str = "hyprsunset";
/// Command used to start the daemon when it is not running.
pub const DEFAULT_DAEMON_COMMAND: &[&str] = &["hyprsunset"];
/// Executable that flips the nightlight on or off. A leading `~` is expanded.
pub const DEFAULT_TOGGLE_COMMAND: &[&str] = &["~/.config/hypr/scripts/nightlight-toggle.sh"];
/// Command that forces a temperature; the Kelvin value is appended.
pub const DEFAULT_SET_TEMPERATURE_COMMAND: &[&str] = &["hyprctl", "hyprsunset", "temperature"];
/// Structured (JSON) introspection command.
pub const DEFAULT_QUERY_JSON_COMMAND: &[&str] = &["hyprctl", "-j", "hyprsunset", "temperature"];
/// Plain-text temperature introspection command.
pub const DEFAULT_QUERY_TEMPERATURE_COMMAND: &[&str] = &["hyprctl", "hyprsunset", "temperature"];
/// Generic plain-text introspection command.
pub const DEFAULT_QUERY_TEXT_COMMAND: &[&str] = &["hyprctl", "hyprsunset"];

/// Temperatures at or above this are treated as daylight (nightlight off).
pub const DEFAULT_OFF_THRESHOLD: u32 = 6000;
/// Temperature applied at the disable time.
pub const DEFAULT_DAYLIGHT_TEMP: u32 = 6500;
/// Upper bound for every external command invocation.
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 2000;

// # Idle-lock Defaults

pub const DEFAULT_IDLE_DAEMON: &str = "hypridle";
pub const DEFAULT_IDLE_SETTLE_ATTEMPTS: u32 = 3;
pub const DEFAULT_IDLE_SETTLE_DELAY_MS: u64 = 100;

// # Files

pub const CONFIG_DIR_NAME: &str = "nightshade";
pub const CONFIG_FILE_NAME: &str = "nightshade.toml";
pub const LOG_FILE_NAME: &str = "nightshade.log";
pub const LOCK_FILE_NAME: &str = "nightshade.lock";

// # Validation Limits

pub const MINIMUM_TEMP: u32 = 1000;
pub const MAXIMUM_TEMP: u32 = 20000;
pub const MINIMUM_COMMAND_TIMEOUT_MS: u64 = 100;
pub const MAXIMUM_COMMAND_TIMEOUT_MS: u64 = 60_000;
pub const MAXIMUM_IDLE_SETTLE_ATTEMPTS: u32 = 20;
pub const MAXIMUM_IDLE_SETTLE_DELAY_MS: u64 = 1000;

// # Status Glyphs

/// Nerd Font moon, shown while the nightlight is warming the display.
pub const ICON_NIGHTLIGHT_ACTIVE: &str = "\u{f0594}";
/// Nerd Font sun, shown in daylight or when the daemon is unreachable.
pub const ICON_NIGHTLIGHT_INACTIVE: &str = "\u{f0599}";
/// Nerd Font coffee cup, idle locking inhibited.
pub const ICON_IDLE_INACTIVE: &str = "\u{f0176}";
/// Nerd Font lock, idle locking armed.
pub const ICON_IDLE_ACTIVE: &str = "\u{f033e}";

// # Exit Codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

// # Test Constants

#[cfg(test)]
pub mod test_constants {
    pub const TEST_ENABLE_TIME: &str = "20:00";
    pub const TEST_DISABLE_TIME: &str = "07:00";
    pub const TEST_TOGGLE_SCRIPT: &str = "/usr/local/bin/nightlight-toggle";
    pub const TEST_NIGHT_TEMP: u32 = 3500;
}
