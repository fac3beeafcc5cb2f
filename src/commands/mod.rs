//! Entry points for each CLI action.
//!
//! `run` and `simulate` drive the scheduler loop; `status` and `idle` are the
//! one-shot Waybar reporters. Reporters silence the logger so standard output
//! carries exactly one JSON record.

pub mod help;
pub mod idle;
pub mod run;
pub mod simulate;
pub mod status;

use std::io::Write;

use crate::config::{self, Config};
use crate::status::StatusRecord;

/// Load configuration for a reporter, falling back to defaults on any error.
pub(crate) fn load_config_or_default(config_dir: Option<String>) -> Config {
    if config::set_config_dir(config_dir).is_err() {
        return Config::default();
    }
    Config::load().unwrap_or_default()
}

/// Print one status record as a single JSON line.
///
/// A closed pipe or a serialization failure is swallowed; reporters always
/// exit successfully.
pub(crate) fn emit_record(record: &StatusRecord) {
    if let Ok(json) = record.to_json() {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{json}");
        let _ = stdout.flush();
    }
}
