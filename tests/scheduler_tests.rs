//! Scheduler loop behaviour over simulated days.

use anyhow::{Result, bail};
use chrono::{Local, TimeZone, Timelike};
use std::sync::{Arc, Mutex};

use nightshade::Scheduler;
use nightshade::config::Config;
use nightshade::daemon::{CommandOutput, CommandRunner};
use nightshade::schedule::{ActivationTime, ScheduledEvent, next_occurrence, sleep_duration};
use nightshade::time_source::{SimulatedTimeSource, TimeSource, parse_datetime};

/// Toggle behaviour for the fake runner.
#[derive(Clone, Copy)]
enum Toggle {
    Succeeds,
    ExitsNonzero,
    CannotStart,
}

struct RecordingRunner {
    toggle: Toggle,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    clock: Arc<SimulatedTimeSource>,
    fired_at: Arc<Mutex<Vec<String>>>,
}

impl CommandRunner for RecordingRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(argv.to_vec());
        self.fired_at
            .lock()
            .unwrap()
            .push(self.clock.now().format("%Y-%m-%d %H:%M").to_string());
        match self.toggle {
            Toggle::Succeeds => Ok(CommandOutput::ok("")),
            Toggle::ExitsNonzero => Ok(CommandOutput::failed(1)),
            Toggle::CannotStart => bail!("No such file or directory"),
        }
    }

    fn spawn_detached(&self, _argv: &[String]) -> Result<()> {
        Ok(())
    }

    fn is_process_running(&self, _name: &str) -> bool {
        true
    }
}

struct Harness {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    fired_at: Arc<Mutex<Vec<String>>>,
}

fn run_window(config: Config, toggle: Toggle, start: &str, end: &str) -> Harness {
    let clock = Arc::new(SimulatedTimeSource::new(
        parse_datetime(start).unwrap(),
        parse_datetime(end).unwrap(),
    ));
    let calls = Arc::new(Mutex::new(Vec::new()));
    let fired_at = Arc::new(Mutex::new(Vec::new()));
    let runner = RecordingRunner {
        toggle,
        calls: calls.clone(),
        clock: clock.clone(),
        fired_at: fired_at.clone(),
    };

    Scheduler::new(config, Box::new(runner), clock)
        .unwrap()
        .run()
        .unwrap();
    Harness { calls, fired_at }
}

fn evening_config() -> Config {
    Config {
        enable_time: Some("20:00".to_string()),
        toggle_command: Some(vec!["/usr/local/bin/nightlight-toggle".to_string()]),
        ..Config::default()
    }
}

#[test]
fn test_toggles_once_per_day_at_enable_time() {
    let harness = run_window(
        evening_config(),
        Toggle::Succeeds,
        "2026-01-05 08:00:00",
        "2026-01-08 08:00:00",
    );

    assert_eq!(
        *harness.fired_at.lock().unwrap(),
        vec!["2026-01-05 20:00", "2026-01-06 20:00", "2026-01-07 20:00"]
    );
}

#[test]
fn test_nonzero_toggle_exit_does_not_stop_the_loop() {
    let harness = run_window(
        evening_config(),
        Toggle::ExitsNonzero,
        "2026-01-05 08:00:00",
        "2026-01-08 08:00:00",
    );
    assert_eq!(harness.calls.lock().unwrap().len(), 3);
}

#[test]
fn test_missing_toggle_binary_does_not_stop_the_loop() {
    let harness = run_window(
        evening_config(),
        Toggle::CannotStart,
        "2026-01-05 08:00:00",
        "2026-01-07 08:00:00",
    );
    assert_eq!(harness.calls.lock().unwrap().len(), 2);
}

#[test]
fn test_started_after_enable_time_waits_for_tomorrow() {
    let harness = run_window(
        evening_config(),
        Toggle::Succeeds,
        "2026-01-05 20:00:01",
        "2026-01-06 19:59:00",
    );
    assert!(harness.calls.lock().unwrap().is_empty());
}

#[test]
fn test_disable_time_forces_daylight_temperature() {
    let config = Config {
        disable_time: Some("06:30".to_string()),
        daylight_temp: Some(6200),
        ..evening_config()
    };
    let harness = run_window(
        config,
        Toggle::Succeeds,
        "2026-01-05 12:00:00",
        "2026-01-06 12:00:00",
    );

    let calls = harness.calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], vec!["/usr/local/bin/nightlight-toggle".to_string()]);
    assert_eq!(calls[1].last().map(String::as_str), Some("6200"));
    assert_eq!(
        *harness.fired_at.lock().unwrap(),
        vec!["2026-01-05 20:00", "2026-01-06 06:30"]
    );
}

#[test]
fn test_schedule_reports_next_event_kind() {
    let config = Config {
        disable_time: Some("07:00".to_string()),
        ..evening_config()
    };
    let schedule = config.schedule().unwrap();
    let morning = Local.with_ymd_and_hms(2026, 1, 5, 5, 0, 0).unwrap();
    let evening = Local.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();

    assert_eq!(schedule.next_event(&morning).event, ScheduledEvent::Disable);
    assert_eq!(schedule.next_event(&evening).event, ScheduledEvent::Enable);
}

#[test]
fn test_rollover_and_non_negative_sleep() {
    let at = ActivationTime::parse("00:30").unwrap();
    let now = Local.with_ymd_and_hms(2026, 1, 5, 23, 59, 0).unwrap();
    let target = next_occurrence(&now, at);

    assert!(target > now);
    assert_eq!((target.hour(), target.minute()), (0, 30));
    assert_eq!(sleep_duration(&now, &target).as_secs(), 31 * 60);
    assert_eq!(sleep_duration(&target, &now).as_secs(), 0);
}
