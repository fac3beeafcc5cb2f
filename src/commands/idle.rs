//! Idle-lock status reporter.
//!
//! The idle daemon can be started or stopped by a keybind at the same moment
//! Waybar polls, so a single process lookup may read a state that is about to
//! change. The settle window re-checks a few times and reports the first
//! observed change, or the initial state if nothing moved.

use anyhow::Result;
use std::time::Duration;

use crate::daemon::{CommandRunner, SystemRunner};
use crate::logger::Log;
use crate::status::StatusRecord;

/// Handle the `idle-status` command.
pub fn handle_idle_status_command(config_dir: Option<String>) -> Result<()> {
    Log::set_enabled(false);

    let config = super::load_config_or_default(config_dir);
    let runner = SystemRunner::new(config.command_timeout());
    let running = settled_running_state(
        &runner,
        config.idle_daemon(),
        config.idle_settle_attempts(),
        config.idle_settle_delay(),
        std::thread::sleep,
    );

    super::emit_record(&StatusRecord::idle_lock(running));
    Ok(())
}

/// Read whether `name` is running, with a bounded settle window.
///
/// One initial lookup, then up to `attempts` re-reads separated by `delay`.
/// Returns early with the new state as soon as a re-read differs.
pub fn settled_running_state<F>(
    runner: &dyn CommandRunner,
    name: &str,
    attempts: u32,
    delay: Duration,
    sleep: F,
) -> bool
where
    F: Fn(Duration),
{
    let initial = runner.is_process_running(name);
    for _ in 0..attempts {
        sleep(delay);
        let current = runner.is_process_running(name);
        if current != initial {
            return current;
        }
    }
    initial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::runner::MockCommandRunner;
    use mockall::Sequence;
    use std::cell::Cell;

    #[test]
    fn test_stable_state_uses_all_attempts() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_is_process_running()
            .times(4)
            .returning(|_| true);

        let sleeps = Cell::new(0);
        let running = settled_running_state(&runner, "hypridle", 3, Duration::from_millis(100), |_| {
            sleeps.set(sleeps.get() + 1)
        });

        assert!(running);
        assert_eq!(sleeps.get(), 3);
    }

    #[test]
    fn test_returns_early_on_change() {
        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        runner
            .expect_is_process_running()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| false);
        runner
            .expect_is_process_running()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| true);

        let sleeps = Cell::new(0);
        let running = settled_running_state(&runner, "hypridle", 3, Duration::from_millis(100), |_| {
            sleeps.set(sleeps.get() + 1)
        });

        assert!(running);
        assert_eq!(sleeps.get(), 1);
    }

    #[test]
    fn test_zero_attempts_is_single_read() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_is_process_running()
            .times(1)
            .returning(|_| false);

        let running = settled_running_state(&runner, "hypridle", 0, Duration::ZERO, |_| {
            panic!("no sleep expected")
        });
        assert!(!running);
    }

    #[test]
    fn test_record_for_settled_state() {
        let record = StatusRecord::idle_lock(false);
        let json = record.to_json().unwrap();
        assert!(json.contains(r#""class":"inactive""#));
        assert!(json.contains(r#""alt":"inactive""#));
    }
}
