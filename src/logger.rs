//! Structured logging with visual formatting and an append-only log file.
//!
//! Console output keeps the box-drawing style shared by every nightshade command.
//! When file logging is active each line is also appended to the log file,
//! stripped of ANSI color codes and prefixed with a bracketed local timestamp,
//! so a scheduler running unattended leaves a readable trail behind it.
//!
//! The logger supports runtime enable/disable. The status reporters disable it
//! entirely because their standard output must carry nothing but JSON.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Log file sink, installed by `Log::start_file_logging` and removed when its guard drops
static LOG_FILE: Mutex<Option<File>> = Mutex::new(None);

/// Main logging interface providing structured output formatting.
///
/// ## Logging Conventions
///
/// - **`log_block_start!`**: opens a new conceptual block (loop start, next
///   event, daemon start). Prints an empty pipe `┃` then `┣ message`.
/// - **`log_decorated!`**: a line belonging to the current block, `┣ message`.
/// - **`log_indented!`**: nested detail under the previous line, `┃   message`.
/// - **`log_pipe!`**: a lone `┃` for vertical spacing before a level-tagged line.
/// - **`log_version!`** / **`log_end!`**: the header and the final `╹` marker.
/// - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`**: level-tagged
///   lines, `┣[LEVEL] message`.
/// - **`log_error_exit!`**: a terminating error, `┗[ERROR] message`.
pub struct Log;

impl Log {
    /// Enable or disable logging.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Start appending log lines to `file_path`.
    ///
    /// The parent directory is created when missing. The file is opened in
    /// append mode so restarts of the scheduler extend the same history.
    pub fn start_file_logging(file_path: &Path) -> Result<LoggerGuard> {
        if let Some(parent) = file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .with_context(|| format!("Failed to open log file {}", file_path.display()))?;

        let mut sink = LOG_FILE
            .lock()
            .map_err(|_| anyhow::anyhow!("Log file sink poisoned"))?;
        if sink.is_some() {
            anyhow::bail!("File logging already active");
        }
        *sink = Some(file);

        Ok(LoggerGuard {
            path: file_path.to_path_buf(),
        })
    }

    /// Whether lines are currently being appended to a log file.
    pub fn is_file_logging() -> bool {
        LOG_FILE.lock().map(|sink| sink.is_some()).unwrap_or(false)
    }

    /// Console prefix for simulated runs, `[HH:MM:SS] ` in simulated time.
    ///
    /// Empty for real-time runs so interactive output stays uncluttered.
    pub fn get_timestamp_prefix() -> String {
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }

    /// Timestamp prefix for log file lines, always present.
    fn file_timestamp_prefix() -> String {
        format!("[{}] ", crate::time_source::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Guard for file logging. Dropping it flushes and detaches the log file.
pub struct LoggerGuard {
    path: PathBuf,
}

impl LoggerGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        if let Ok(mut sink) = LOG_FILE.lock()
            && let Some(mut file) = sink.take()
        {
            let _ = file.flush();
        }
    }
}

/// Strip ANSI color sequences (`ESC [ ... m`) so the log file stays plain text.
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Write one formatted line to the console and, when active, the log file.
///
/// Called by the logging macros; `line` carries no trailing newline.
pub fn write_line(line: &str) {
    if !Log::is_enabled() {
        return;
    }

    let prefix = Log::get_timestamp_prefix();
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{prefix}{line}");
    let _ = stdout.flush();
    drop(stdout);

    if let Ok(mut sink) = LOG_FILE.lock()
        && let Some(file) = sink.as_mut()
    {
        let clean = strip_ansi_codes(line);
        let stamp = Log::file_timestamp_prefix();
        let _ = writeln!(file, "{stamp}{clean}");
        let _ = file.flush();
    }
}

// # Logging Macros

/// Log a decorated message as part of the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)*) => {{
        $crate::logger::write_line(&format!("┣ {}", format_args!($($arg)*)));
    }};
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)*) => {{
        $crate::logger::write_line(&format!("┃   {}", format_args!($($arg)*)));
    }};
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        $crate::logger::write_line("┃");
    }};
}

/// Log a block start message, initiating a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)*) => {{
        $crate::logger::write_line("┃");
        $crate::logger::write_line(&format!("┣ {}", format_args!($($arg)*)));
    }};
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {{
        $crate::logger::write_line(&format!("┏ nightshade v{} ━━╸", env!("CARGO_PKG_VERSION")));
    }};
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        $crate::logger::write_line("╹");
    }};
}

/// Log a warning message with pipe prefix and yellow-colored tag.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {{
        $crate::logger::write_line(&format!(
            "┣[\x1b[33mWARNING\x1b[0m] {}",
            format_args!($($arg)*)
        ));
    }};
}

/// Log an error message with pipe prefix and red-colored tag.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        $crate::logger::write_line(&format!(
            "┣[\x1b[31mERROR\x1b[0m] {}",
            format_args!($($arg)*)
        ));
    }};
}

/// Log an error that ends the current flow, closing the block with `┗`.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)*) => {{
        $crate::logger::write_line("┃");
        $crate::logger::write_line(&format!(
            "┗[\x1b[31mERROR\x1b[0m] {}",
            format_args!($($arg)*)
        ));
    }};
}

/// Log an informational message with pipe prefix and green-colored tag.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        $crate::logger::write_line(&format!(
            "┣[\x1b[32mINFO\x1b[0m] {}",
            format_args!($($arg)*)
        ));
    }};
}

/// Log a debug/operational message with pipe prefix and green-colored tag.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        $crate::logger::write_line(&format!(
            "┣[\x1b[32mDEBUG\x1b[0m] {}",
            format_args!($($arg)*)
        ));
    }};
}
