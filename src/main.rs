//! Binary entry point: parse arguments and dispatch to a command.
//!
//! Exit status is 0 on success (the reporters always succeed) and 1 for
//! startup failures such as an invalid configuration, a second scheduler
//! instance, or unknown arguments.

use nightshade::args::{self, CliAction, ParsedArgs};
use nightshade::commands;
use nightshade::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use nightshade::log_error_exit;

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let result = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::HelpCommand { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => commands::run::handle_run_command(debug_enabled, config_dir),
        CliAction::Status { config_dir } => commands::status::handle_status_command(config_dir),
        CliAction::IdleStatus { config_dir } => {
            commands::idle::handle_idle_status_command(config_dir)
        }
        CliAction::Simulate {
            start_time,
            end_time,
            config_dir,
        } => commands::simulate::handle_simulate_command(start_time, end_time, config_dir),
    };

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            log_error_exit!("{e:#}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}
