//! Implementation of the `simulate` command for checking a schedule.
//!
//! The scheduler runs over a fast-forward simulated clock with a runner that
//! only logs what it would execute, so days of schedule play out instantly and
//! nothing on the system changes.

use anyhow::{Result, bail};
use chrono::{DateTime, Local};
use std::sync::Arc;

use crate::common::utils::display_command;
use crate::config::{self, Config};
use crate::core::Scheduler;
use crate::daemon::{CommandOutput, CommandRunner, SystemRunner};
use crate::schedule::ScheduledEvent;
use crate::time_source::{self, SimulatedTimeSource, TimeSource};

/// Runner that logs commands instead of executing them.
///
/// Process lookups are real (read-only) so the daemon check reflects the
/// current session.
pub struct DryRunRunner {
    lookup: SystemRunner,
}

impl DryRunRunner {
    pub fn new(lookup: SystemRunner) -> Self {
        Self { lookup }
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput> {
        log_indented!("Would run: {}", display_command(argv));
        Ok(CommandOutput::ok(""))
    }

    fn spawn_detached(&self, argv: &[String]) -> Result<()> {
        log_indented!("Would start: {}", display_command(argv));
        Ok(())
    }

    fn is_process_running(&self, name: &str) -> bool {
        self.lookup.is_process_running(name)
    }
}

/// Handle the `simulate` command.
pub fn handle_simulate_command(
    start_time: String,
    end_time: String,
    config_dir: Option<String>,
) -> Result<()> {
    let start = time_source::parse_datetime(&start_time)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {e}"))?;
    let end = time_source::parse_datetime(&end_time)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {e}"))?;
    if end <= start {
        bail!("End time must be after start time");
    }

    config::set_config_dir(config_dir)?;
    let config = Config::load()?;

    // Install before the first log line so prefixes show simulated time
    let clock = Arc::new(SimulatedTimeSource::new(start, end));
    time_source::init_time_source(clock.clone());

    log_version!();
    log_block_start!(
        "Simulating {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );

    let runner = DryRunRunner::new(SystemRunner::new(config.command_timeout()));
    let events = simulate(config, Box::new(runner), clock)?;

    log_block_start!("Simulation complete: {} event(s)", events.len());
    for (at, event) in &events {
        log_indented!("{} {event}", at.format("%Y-%m-%d %H:%M"));
    }
    log_end!();
    Ok(())
}

/// Walk the schedule until `clock` ends, returning each executed event.
pub fn simulate(
    config: Config,
    runner: Box<dyn CommandRunner>,
    clock: Arc<SimulatedTimeSource>,
) -> Result<Vec<(DateTime<Local>, ScheduledEvent)>> {
    let mut scheduler = Scheduler::new(config, runner, clock.clone())?;
    let mut events = Vec::new();
    while let Some(event) = scheduler.run_once()? {
        events.push((clock.now(), event));
    }
    Ok(events)
}
