//! Lock file management for single-instance enforcement.
//!
//! Two schedulers would both run the toggle command and cancel each other out,
//! so `run` takes an exclusive lock first. The lock is an advisory `flock` held
//! for the lifetime of the process; the kernel releases it when the process
//! dies, so a crashed scheduler never leaves a stale lock behind.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::common::constants::LOCK_FILE_NAME;

/// A held instance lock. Dropping it releases the lock.
#[derive(Debug)]
pub struct InstanceLock {
    _file: File,
    path: PathBuf,
}

impl InstanceLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Outcome of trying to take the instance lock.
#[derive(Debug)]
pub enum LockStatus {
    Acquired(InstanceLock),
    /// Another live process holds the lock; its PID when readable.
    HeldBy(Option<u32>),
}

/// Default lock path: `$XDG_RUNTIME_DIR/nightshade.lock`, or `/run/user/{uid}`.
pub fn default_lock_path() -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .unwrap_or_else(|_| format!("/run/user/{}", nix::unistd::getuid()));
    PathBuf::from(runtime_dir).join(LOCK_FILE_NAME)
}

/// Try to take the exclusive instance lock at `lock_path`.
///
/// On success the file holds our PID.
pub fn acquire_lock(lock_path: &Path) -> Result<LockStatus> {
    // Open without truncating: the holder's PID must survive a failed attempt
    let mut lock_file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)
        .with_context(|| format!("Failed to open lock file {}", lock_path.display()))?;

    if lock_file.try_lock_exclusive().is_err() {
        return Ok(LockStatus::HeldBy(read_holder_pid(lock_path)));
    }

    lock_file.set_len(0)?;
    lock_file.seek(SeekFrom::Start(0))?;
    writeln!(&lock_file, "{}", std::process::id())?;
    lock_file.flush()?;

    Ok(LockStatus::Acquired(InstanceLock {
        _file: lock_file,
        path: lock_path.to_path_buf(),
    }))
}

fn read_holder_pid(lock_path: &Path) -> Option<u32> {
    std::fs::read_to_string(lock_path)
        .ok()?
        .lines()
        .next()?
        .trim()
        .parse()
        .ok()
}
