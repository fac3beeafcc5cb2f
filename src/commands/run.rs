//! The `run` command: start the scheduler loop for real.

use anyhow::{Result, bail};
use std::path::Path;

use crate::common::utils::private_path;
use crate::config::{self, Config};
use crate::core::Scheduler;
use crate::daemon::SystemRunner;
use crate::io::lock::{InstanceLock, LockStatus, acquire_lock, default_lock_path};
use crate::io::signals::setup_signal_handler;
use crate::logger::Log;
use crate::time_source;

/// Handle the `run` command.
///
/// Returns an error for startup failures only (configuration, another running
/// instance). Once the loop is running it stops only on SIGINT, SIGTERM or
/// SIGHUP.
pub fn handle_run_command(debug_enabled: bool, config_dir: Option<String>) -> Result<()> {
    config::set_config_dir(config_dir)?;

    log_version!();
    let config = Config::load()?;

    let log_path = config.log_file_path();
    let _log_guard = match Log::start_file_logging(&log_path) {
        Ok(guard) => {
            log_block_start!("Logging to {}", private_path(&log_path));
            Some(guard)
        }
        Err(e) => {
            log_pipe!();
            log_warning!("File logging disabled: {e:#}");
            None
        }
    };

    if debug_enabled {
        log_pipe!();
        log_debug!("Debug mode enabled");
        config.log_config();
    }

    let _lock = take_instance_lock(&default_lock_path())?;

    let signals = setup_signal_handler()?;
    let runner = SystemRunner::new(config.command_timeout());

    Scheduler::new(config, Box::new(runner), time_source::global())?
        .with_shutdown(signals.receiver)
        .run()
}

/// Take the single-instance lock at `lock_path`.
///
/// Another live scheduler is a hard error. A lock file that cannot be opened
/// at all (no runtime directory, read-only filesystem) only costs the
/// duplicate-instance check, so the scheduler warns and runs unlocked.
fn take_instance_lock(lock_path: &Path) -> Result<Option<InstanceLock>> {
    match acquire_lock(lock_path) {
        Ok(LockStatus::Acquired(lock)) => Ok(Some(lock)),
        Ok(LockStatus::HeldBy(Some(pid))) => {
            bail!("nightshade is already running (PID {pid})")
        }
        Ok(LockStatus::HeldBy(None)) => bail!(
            "nightshade is already running (lock held on {})",
            private_path(lock_path)
        ),
        Err(e) => {
            log_pipe!();
            log_warning!("Running without the instance lock: {e:#}");
            Ok(None)
        }
    }
}
