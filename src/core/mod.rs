//! The scheduler loop.
//!
//! `Scheduler` owns the resolved schedule, a command runner and a clock. Each
//! cycle picks the nearest upcoming event, waits until it is due, and runs the
//! matching command:
//!
//! - `Enable` runs the toggle command
//! - `Disable` forces the daemon back to the daylight temperature
//!
//! A failing command is logged and the loop carries on with the next day. The
//! loop only ends on a shutdown signal or when a simulated clock runs out.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::common::utils::{display_command, format_duration};
use crate::config::Config;
use crate::daemon::{self, CommandRunner};
use crate::io::signals::{SignalMessage, signal_name};
use crate::schedule::{NextEvent, Schedule, ScheduledEvent, sleep_duration};
use crate::time_source::TimeSource;

/// How a wait for the next event ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitOutcome {
    Due,
    Shutdown(i32),
    ClockEnded,
}

pub struct Scheduler {
    config: Config,
    schedule: Schedule,
    runner: Box<dyn CommandRunner>,
    clock: Arc<dyn TimeSource>,
    shutdown: Option<Receiver<SignalMessage>>,
}

impl Scheduler {
    /// Build a scheduler. Fails only when the configured times do not parse.
    pub fn new(
        config: Config,
        runner: Box<dyn CommandRunner>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        let schedule = config.schedule()?;
        Ok(Self {
            config,
            schedule,
            runner,
            clock,
            shutdown: None,
        })
    }

    /// Stop waiting as soon as a shutdown message arrives on `receiver`.
    pub fn with_shutdown(mut self, receiver: Receiver<SignalMessage>) -> Self {
        self.shutdown = Some(receiver);
        self
    }

    /// Run until shutdown or until a simulated clock ends.
    pub fn run(&mut self) -> Result<()> {
        log_block_start!("Scheduler started");
        log_indented!("Enable at {}", self.schedule.enable);
        if let Some(disable) = self.schedule.disable {
            log_indented!(
                "Disable at {disable} ({}K)",
                self.config.daylight_temp()
            );
        }

        daemon::ensure_daemon_running(self.runner.as_ref(), &self.config);

        while self.run_once()?.is_some() {}

        log_block_start!("Scheduler stopped");
        log_end!();
        Ok(())
    }

    /// Wait for the next event and run it.
    ///
    /// Returns the executed event, or `None` when the loop should stop.
    pub fn run_once(&mut self) -> Result<Option<ScheduledEvent>> {
        if self.clock.is_ended() {
            return Ok(None);
        }

        let now = self.clock.now();
        let next = self.schedule.next_event(&now);
        log_block_start!(
            "Next {} at {} (in {})",
            next.event,
            next.at.format("%Y-%m-%d %H:%M:%S"),
            format_duration(sleep_duration(&now, &next.at))
        );

        match self.wait_until(&next)? {
            WaitOutcome::Due => {}
            WaitOutcome::Shutdown(signal) => {
                log_block_start!("Received {}, stopping", signal_name(signal));
                return Ok(None);
            }
            WaitOutcome::ClockEnded => {
                log_block_start!("Simulation reached its end time");
                return Ok(None);
            }
        }

        self.execute(next.event);
        Ok(Some(next.event))
    }

    /// Sleep until `next.at`, re-arming when woken early.
    fn wait_until(&self, next: &NextEvent<Local>) -> Result<WaitOutcome> {
        loop {
            let now = self.clock.now();
            if now >= next.at {
                return Ok(WaitOutcome::Due);
            }
            if self.clock.is_ended() {
                return Ok(WaitOutcome::ClockEnded);
            }
            if let Some(signal) = self.wait(sleep_duration(&now, &next.at)) {
                return Ok(WaitOutcome::Shutdown(signal));
            }
        }
    }

    /// Wait for `duration`, returning the signal number if a shutdown arrived.
    fn wait(&self, duration: Duration) -> Option<i32> {
        let Some(receiver) = &self.shutdown else {
            self.clock.sleep(duration);
            return None;
        };

        // A simulated clock advances instantly, so only poll
        if self.clock.is_simulated() {
            if let Ok(SignalMessage::Shutdown { signal }) = receiver.try_recv() {
                return Some(signal);
            }
            self.clock.sleep(duration);
            return None;
        }

        match receiver.recv_timeout(duration) {
            Ok(SignalMessage::Shutdown { signal }) => Some(signal),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.clock.sleep(duration);
                None
            }
        }
    }

    /// Run the command for `event`. Failures are logged, never returned.
    fn execute(&self, event: ScheduledEvent) {
        let argv = match event {
            ScheduledEvent::Enable => self.config.toggle_command(),
            ScheduledEvent::Disable => self
                .config
                .set_temperature_command(self.config.daylight_temp()),
        };

        log_block_start!("Running {event} command at {}", timestamp(&self.clock.now()));
        log_indented!("Command: {}", display_command(&argv));

        match self.runner.run(&argv) {
            Ok(output) if output.success() => {
                log_decorated!("{} command finished", capitalize(event.display_name()));
            }
            Ok(output) => {
                log_pipe!();
                log_warning!(
                    "{} command failed: {}",
                    capitalize(event.display_name()),
                    output.failure_reason()
                );
                log_indented!("Will try again at the next scheduled time");
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Could not run {event} command: {e}");
                log_indented!("Will try again at the next scheduled time");
            }
        }
    }
}

fn timestamp(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
