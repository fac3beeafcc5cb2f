//! Help command implementation.

use anyhow::Result;

/// Run the help command.
///
/// Unknown topics fall back to the general help after a warning.
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None | Some("help") => crate::args::display_help(),
        Some("status") | Some("report-status") => display_status_help(),
        Some("idle-status") => display_idle_help(),
        Some("simulate") => display_simulate_help(),
        Some(unknown) => {
            log_warning!("Unknown command: {unknown}");
            crate::args::display_help();
        }
    }
    Ok(())
}

fn display_status_help() {
    log_version!();
    log_block_start!("status - Print the nightlight state for Waybar");
    log_block_start!("Usage: nightshade status");
    log_block_start!("Output:");
    log_indented!("{{\"text\":\"3500K\",\"tooltip\":\"...\",\"class\":\"active\"}}");
    log_indented!("Temperatures at or above off_threshold show as OFF");
    log_end!();
}

fn display_idle_help() {
    log_version!();
    log_block_start!("idle-status - Print the idle-lock state for Waybar");
    log_block_start!("Usage: nightshade idle-status");
    log_indented!("Re-checks the idle daemon a few times before answering");
    log_indented!("so a daemon that was just started or stopped reads correctly");
    log_end!();
}

fn display_simulate_help() {
    log_version!();
    log_block_start!("simulate - Dry-run the schedule");
    log_block_start!("Usage: nightshade simulate <start> <end>");
    log_block_start!("Arguments:");
    log_indented!("start, end  Local times as \"YYYY-MM-DD HH:MM:SS\"");
    log_block_start!("Example:");
    log_indented!("nightshade simulate \"2026-01-05 12:00:00\" \"2026-01-08 12:00:00\"");
    log_end!();
}
