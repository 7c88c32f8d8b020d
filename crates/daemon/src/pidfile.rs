// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive lock on the daemon's pid file, so a second `fbuildd` can't
//! start while one is already running.

use crate::error::LifecycleError;
use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Holds the exclusive lock for as long as it's alive. Dropping it releases
/// the lock and removes the pid file.
pub struct PidFile {
    path: PathBuf,
    file: File,
}

impl PidFile {
    /// Acquires the lock at `path`, creating it if needed, and writes this
    /// process's pid. Fails immediately (never blocks) if another process
    /// already holds it.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, LifecycleError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Open without truncating so a concurrent holder's pid survives
        // until we actually own the lock.
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        file.try_lock_exclusive()
            .map_err(|_| LifecycleError::AlreadyRunning(path.clone()))?;

        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        file.sync_all()?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Reads the pid recorded in a pid file without acquiring its lock, for
/// clients that just want to know who's running (or check liveness).
pub fn read_pid(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
