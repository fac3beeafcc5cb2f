//! # nightshade library
//!
//! Internal library for the nightshade binary.
//!
//! The library exists so the scheduler, reporters and their helpers can be
//! tested without going through the CLI. The binary in `main.rs` only parses
//! arguments and dispatches to `commands`.
//!
//! ## Architecture
//!
//! - **Scheduling**: `schedule` computes the next enable/disable instant, `core`
//!   runs the wait-and-act loop against a `time_source`
//! - **Daemon access**: `daemon` wraps every external command behind the
//!   `CommandRunner` trait and turns daemon output into a `DaemonState`
//! - **Reporting**: `status` renders Waybar JSON records
//! - **Configuration**: `config` for the TOML file and `NIGHTSHADE_*` overrides
//! - **Infrastructure**: `io` for the instance lock and signals, `logger`

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod daemon;
pub mod io;
pub mod schedule;
pub mod status;
pub mod time_source;

pub use crate::core::Scheduler;
