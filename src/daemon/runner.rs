//! External command execution with bounded waits.
//!
//! Every interaction with the outside world (hyprctl queries, the toggle
//! script, pgrep, starting the daemon) goes through [`CommandRunner`]. The
//! system implementation never blocks longer than its timeout: output is drained
//! on reader threads while the child is awaited, and a child that overstays is
//! killed.

use anyhow::{Context, Result};
use std::io::Read;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Captured output is capped; anything beyond is drained and discarded.
const MAX_OUTPUT_SIZE: usize = 64 * 1024;

/// How long to wait for reader threads after the child has exited.
///
/// A child that forks a long-lived background process hands it the pipe, so
/// the reader may never see EOF.
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_millis(250);

/// Result of running an external command to completion (or to its timeout).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal or by the timeout.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CommandOutput {
    /// Successful output with the given stdout, mostly for tests.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    /// Failed output with the given exit code.
    pub fn failed(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0) && !self.timed_out
    }

    /// Short human-readable reason for a failure, for log lines.
    pub fn failure_reason(&self) -> String {
        if self.timed_out {
            return "timed out".to_string();
        }
        let detail = self.stderr.trim().lines().last().unwrap_or("").trim();
        let status = match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        if detail.is_empty() {
            status
        } else {
            format!("{status}: {detail}")
        }
    }
}

/// Seam for every external process interaction.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `argv` to completion, capturing output.
    ///
    /// Returns `Err` only when the command cannot be started at all. A nonzero
    /// exit or a timeout is reported through [`CommandOutput`].
    fn run(&self, argv: &[String]) -> Result<CommandOutput>;

    /// Start `argv` in the background without waiting for it.
    fn spawn_detached(&self, argv: &[String]) -> Result<()>;

    /// Whether a process with exactly this name is running.
    fn is_process_running(&self, name: &str) -> bool;
}

/// Runner backed by real processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn build_command(argv: &[String]) -> Result<Command> {
    let (program, args) = argv
        .split_first()
        .context("Cannot run an empty command")?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput> {
        let mut cmd = build_command(argv)?;
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start '{}'", argv.join(" ")))?;

        // Drain both pipes while waiting, or a chatty child blocks on a full pipe
        let stdout_rx = spawn_reader(child.stdout.take());
        let stderr_rx = spawn_reader(child.stderr.take());

        let status = child
            .wait_timeout(self.timeout)
            .with_context(|| format!("Failed to wait for '{}'", argv.join(" ")))?;

        let timed_out = status.is_none();
        if timed_out {
            let _ = child.kill();
            let _ = child.wait();
        }

        Ok(CommandOutput {
            code: status.and_then(|s| s.code()),
            stdout: stdout_rx
                .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
                .unwrap_or_default(),
            stderr: stderr_rx
                .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
                .unwrap_or_default(),
            timed_out,
        })
    }

    fn spawn_detached(&self, argv: &[String]) -> Result<()> {
        let mut cmd = build_command(argv)?;
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .process_group(0)
            .spawn()
            .with_context(|| format!("Failed to start '{}'", argv.join(" ")))?;

        // Reap the child whenever it exits so it never lingers as a zombie
        thread::spawn(move || {
            let _ = child.wait();
        });

        Ok(())
    }

    fn is_process_running(&self, name: &str) -> bool {
        let argv = ["pgrep".to_string(), "-x".to_string(), name.to_string()];
        match self.run(&argv) {
            Ok(output) => output.success() && !output.stdout.trim().is_empty(),
            Err(_) => false,
        }
    }
}

fn spawn_reader<R>(stream: Option<R>) -> mpsc::Receiver<String>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_stream_to_string(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                buf.extend_from_slice(&chunk[..n.min(remaining)]);
                if n >= remaining {
                    // Keep draining so the writer never blocks
                    let mut discard = [0u8; 4096];
                    while stream.read(&mut discard).unwrap_or(0) > 0 {}
                    break;
                }
            }
            Err(_) => break,
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}
