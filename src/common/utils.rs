//! Small shared helpers for paths and human-readable durations.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Expand a leading `~` or `~/` to the user's home directory.
///
/// Anything else, including `~user` forms, is returned unchanged.
pub fn expand_tilde(input: &str) -> PathBuf {
    if input == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = input.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(input)
}

/// Render a path for logs with the home directory collapsed to `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}

/// Format a duration compactly for log lines, e.g. `7h42m`, `13m`, `45s`.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    if total_seconds < 60 {
        return format!("{total_seconds}s");
    }

    // Round to the nearest minute once past the first minute
    let mut total_minutes = total_seconds / 60;
    if total_seconds % 60 > 30 {
        total_minutes += 1;
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match (hours, minutes) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h{m}m"),
    }
}

/// Join an argv list for display in log lines.
pub fn display_command(argv: &[String]) -> String {
    argv.join(" ")
}
