//! Command-line argument parsing and processing.
//!
//! nightshade takes one optional subcommand plus a handful of global flags.
//! With no subcommand the scheduler runs, matching how a compositor autostart
//! line usually invokes it.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the scheduler loop
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Print one nightlight status record and exit
    Status { config_dir: Option<String> },
    /// Print one idle-lock status record and exit
    IdleStatus { config_dir: Option<String> },
    /// Walk the schedule over a simulated time window without running commands
    Simulate {
        start_time: String,
        end_time: String,
        config_dir: Option<String>,
    },

    /// Help subcommand, optionally for one command
    HelpCommand { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped. Help and version
    /// flags take precedence over everything else; any unrecognized argument
    /// yields [`CliAction::ShowHelpDueToError`].
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;
        let mut config_dir: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();

        let mut iter = args_vec.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--config" | "-c" => match iter.next() {
                    Some(dir) if !dir.starts_with('-') => config_dir = Some(dir),
                    _ => unknown_arg_found = true,
                },
                _ if arg.starts_with('-') => unknown_arg_found = true,
                _ => positionals.push(arg),
            }
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if display_help {
            CliAction::ShowHelp
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else {
            Self::action_for(positionals, debug_enabled, config_dir)
        };

        ParsedArgs { action }
    }

    fn action_for(
        positionals: Vec<String>,
        debug_enabled: bool,
        config_dir: Option<String>,
    ) -> CliAction {
        let mut positionals = positionals.into_iter();
        let Some(command) = positionals.next() else {
            return CliAction::Run {
                debug_enabled,
                config_dir,
            };
        };
        let rest: Vec<String> = positionals.collect();

        match (command.as_str(), rest.as_slice()) {
            ("run" | "run-scheduler", []) => CliAction::Run {
                debug_enabled,
                config_dir,
            },
            ("status" | "report-status", []) => CliAction::Status { config_dir },
            ("idle-status", []) => CliAction::IdleStatus { config_dir },
            ("simulate", [start, end]) => CliAction::Simulate {
                start_time: start.clone(),
                end_time: end.clone(),
                config_dir,
            },
            ("help", [] | [_]) => CliAction::HelpCommand {
                command: rest.first().cloned(),
            },
            _ => CliAction::ShowHelpDueToError,
        }
    }

    /// Parse from the process arguments.
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Display version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Display custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("nightshade [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Log the effective configuration at startup");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Run the scheduler loop (default)");
    log_indented!("status                 Print the nightlight status as Waybar JSON");
    log_indented!("idle-status            Print the idle-lock status as Waybar JSON");
    log_indented!("simulate <start> <end> Dry-run the schedule over a time window");
    log_indented!("                       Times use \"YYYY-MM-DD HH:MM:SS\"");
    log_indented!("help                   Show this help");
    log_end!();
}
