//! Observing and driving the color temperature daemon.
//!
//! The daemon (hyprsunset by default) is an external process reached only
//! through command-line tools. This module turns its introspection output into a
//! [`DaemonState`] using a tiered fallback, and makes sure it is running when the
//! scheduler starts.
//!
//! ## Query tiers
//!
//! 1. Structured query (`query_json_command`). `running: false` means off
//!    immediately; otherwise a numeric temperature is extracted.
//! 2. Plain-text queries, `query_temperature_command` first and then
//!    `query_text_command`. A `disabled` marker means off; otherwise the first
//!    3 to 5 digit number is taken as the temperature.
//! 3. Nothing usable: the daemon is reported off.
//!
//! Failures at any tier are never surfaced; they only move the query to the
//! next tier. Every command is bounded by the runner's timeout.

pub mod parse;
pub mod runner;

pub use runner::{CommandOutput, CommandRunner, SystemRunner};

use crate::common::utils::display_command;
use crate::config::Config;

/// Observed daemon state at one point in time. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DaemonState {
    pub running: bool,
    pub temperature: Option<u32>,
}

impl DaemonState {
    /// Not running, or unreachable.
    pub fn off() -> Self {
        Self {
            running: false,
            temperature: None,
        }
    }

    pub fn running_at(temperature: u32) -> Self {
        Self {
            running: true,
            temperature: Some(temperature),
        }
    }

    /// Whether the nightlight effect is visible under `off_threshold`.
    pub fn is_active(&self, off_threshold: u32) -> bool {
        self.running
            && self
                .temperature
                .is_some_and(|t| is_active_temperature(t, off_threshold))
    }
}

/// Classification rule: active iff `0 < temperature < off_threshold`.
pub fn is_active_temperature(temperature: u32, off_threshold: u32) -> bool {
    temperature > 0 && temperature < off_threshold
}

/// Run `argv` and return its stdout when it succeeded.
fn successful_stdout(runner: &dyn CommandRunner, argv: &[String]) -> Option<String> {
    match runner.run(argv) {
        Ok(output) if output.success() => Some(output.stdout),
        _ => None,
    }
}

/// Query the daemon through the tiered fallback. Never fails.
pub fn query_state(runner: &dyn CommandRunner, config: &Config) -> DaemonState {
    if let Some(stdout) = successful_stdout(runner, &config.query_json_command())
        && let Some(state) = parse::parse_json_state(&stdout)
    {
        return state;
    }

    for argv in [
        config.query_temperature_command(),
        config.query_text_command(),
    ] {
        let Some(stdout) = successful_stdout(runner, &argv) else {
            continue;
        };
        if parse::is_disabled(&stdout) {
            return DaemonState::off();
        }
        if let Some(kelvin) = parse::extract_kelvin(&stdout) {
            return DaemonState::running_at(kelvin);
        }
    }

    DaemonState::off()
}

/// Start the daemon when it is not running.
///
/// Fire-and-forget: a failed start is logged and otherwise ignored, since the
/// toggle command may be able to start the daemon itself. Returns whether a
/// start was attempted.
pub fn ensure_daemon_running(runner: &dyn CommandRunner, config: &Config) -> bool {
    let name = config.daemon();
    if runner.is_process_running(name) {
        log_decorated!("{name} is running");
        return false;
    }

    let argv = config.daemon_command();
    log_block_start!("{name} is not running, starting it");
    log_indented!("Command: {}", display_command(&argv));

    match runner.spawn_detached(&argv) {
        Ok(()) => log_decorated!("Started {name}"),
        Err(e) => {
            log_pipe!();
            log_warning!("Failed to start {name}: {e}");
            log_indented!("Continuing; the toggle command may start it instead");
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::runner::MockCommandRunner;
    use super::*;
    use mockall::predicate::*;

    fn argv_is(expected: Vec<String>) -> impl Fn(&[String]) -> bool {
        move |argv: &[String]| argv == expected.as_slice()
    }

    #[test]
    fn test_classification_examples() {
        assert!(is_active_temperature(3500, 6000));
        assert!(!is_active_temperature(6000, 6000));
        assert!(!is_active_temperature(0, 6000));
        assert!(!is_active_temperature(6500, 6000));
        assert!(is_active_temperature(5999, 6000));
    }

    #[test]
    fn test_not_running_is_never_active() {
        let state = DaemonState {
            running: false,
            temperature: Some(3500),
        };
        assert!(!state.is_active(6000));
        assert!(!DaemonState::off().is_active(6000));
        assert!(DaemonState::running_at(3500).is_active(6000));
    }

    #[test]
    fn test_query_prefers_structured_output() {
        let config = Config::default();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(argv_is(config.query_json_command()))
            .times(1)
            .returning(|_| Ok(CommandOutput::ok(r#"{"running": true, "temperature": 3500}"#)));

        assert_eq!(query_state(&runner, &config), DaemonState::running_at(3500));
    }

    #[test]
    fn test_query_running_false_stops_immediately() {
        let config = Config::default();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(argv_is(config.query_json_command()))
            .times(1)
            .returning(|_| Ok(CommandOutput::ok(r#"{"running": false, "temperature": 3500}"#)));

        assert_eq!(query_state(&runner, &config), DaemonState::off());
    }

    #[test]
    fn test_query_falls_back_to_temperature_subcommand() {
        let config = Config::default();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(argv_is(config.query_json_command()))
            .returning(|_| Ok(CommandOutput::ok("unknown request")));
        runner
            .expect_run()
            .withf(argv_is(config.query_temperature_command()))
            .returning(|_| Ok(CommandOutput::ok("4000\n")));

        assert_eq!(query_state(&runner, &config), DaemonState::running_at(4000));
    }

    #[test]
    fn test_query_disabled_marker_means_off() {
        let config = Config::default();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(argv_is(config.query_json_command()))
            .returning(|_| Err(anyhow::anyhow!("hyprctl not found")));
        runner
            .expect_run()
            .withf(argv_is(config.query_temperature_command()))
            .returning(|_| Ok(CommandOutput::ok("hyprsunset disabled")));

        assert_eq!(query_state(&runner, &config), DaemonState::off());
    }

    #[test]
    fn test_query_uses_generic_text_last() {
        let config = Config::default();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(argv_is(config.query_json_command()))
            .returning(|_| Ok(CommandOutput::failed(1)));
        runner
            .expect_run()
            .withf(argv_is(config.query_temperature_command()))
            .returning(|_| Ok(CommandOutput::ok("ok")));
        runner
            .expect_run()
            .withf(argv_is(config.query_text_command()))
            .returning(|_| Ok(CommandOutput::ok("temperature: 4200K, gamma: 100%")));

        assert_eq!(query_state(&runner, &config), DaemonState::running_at(4200));
    }

    #[test]
    fn test_query_all_tiers_failing_defaults_off() {
        let config = Config::default();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(3).returning(|_| {
            Ok(CommandOutput {
                timed_out: true,
                ..CommandOutput::default()
            })
        });

        assert_eq!(query_state(&runner, &config), DaemonState::off());
    }

    #[test]
    fn test_ensure_daemon_running_skips_when_present() {
        let config = Config::default();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_is_process_running()
            .with(eq("hyprsunset"))
            .returning(|_| true);
        runner.expect_spawn_detached().never();

        assert!(!ensure_daemon_running(&runner, &config));
    }

    #[test]
    fn test_ensure_daemon_running_tolerates_start_failure() {
        let config = Config::default();
        let mut runner = MockCommandRunner::new();
        runner.expect_is_process_running().returning(|_| false);
        runner
            .expect_spawn_detached()
            .withf(argv_is(vec!["hyprsunset".to_string()]))
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("No such file or directory")));

        assert!(ensure_daemon_running(&runner, &config));
    }
}
