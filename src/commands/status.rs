//! Nightlight status reporter.
//!
//! Queries the daemon once, classifies, prints one JSON record and returns.
//! No state is kept between invocations.

use anyhow::Result;

use crate::daemon::{self, SystemRunner};
use crate::logger::Log;
use crate::status::StatusRecord;

/// Handle the `status` command.
pub fn handle_status_command(config_dir: Option<String>) -> Result<()> {
    Log::set_enabled(false);

    let config = super::load_config_or_default(config_dir);
    let runner = SystemRunner::new(config.command_timeout());
    let state = daemon::query_state(&runner, &config);

    super::emit_record(&StatusRecord::nightlight(&state, config.off_threshold()));
    Ok(())
}
