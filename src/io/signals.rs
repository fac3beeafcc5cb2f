//! Signal handling for the long-running scheduler.
//!
//! A background thread turns SIGINT, SIGTERM and SIGHUP into a
//! [`SignalMessage::Shutdown`] on a channel. The scheduler sleeps with
//! `recv_timeout` on that channel, so a signal ends a multi-hour wait at once
//! and the loop can write its final log line before exiting.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::sync::mpsc::{Receiver, channel};
use std::thread;

/// Messages delivered from the signal thread to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// SIGTERM, SIGINT or SIGHUP
    Shutdown { signal: i32 },
}

/// Signal handling state owned by the scheduler.
pub struct SignalState {
    pub receiver: Receiver<SignalMessage>,
}

/// Human-readable signal name for log lines.
pub fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGHUP => "SIGHUP",
        _ => "signal",
    }
}

/// Install handlers for SIGINT, SIGTERM and SIGHUP.
pub fn setup_signal_handler() -> Result<SignalState> {
    let (sender, receiver) = channel::<SignalMessage>();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    thread::spawn(move || {
        for signal in signals.forever() {
            if sender
                .send(SignalMessage::Shutdown { signal })
                .is_err()
            {
                // Receiver gone, the scheduler has already stopped
                break;
            }
        }
    });

    Ok(SignalState { receiver })
}
