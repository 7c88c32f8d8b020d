// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralizes the state-directory path conventions so the daemon and its
//! clients agree on where every pid file, status snapshot, inbox entry and
//! signal file lives without either side importing the other.

use std::io;
use std::path::{Path, PathBuf};

/// Overrides the state directory; mainly for tests, which don't want to
/// touch the real user home.
pub const STATE_DIR_ENV: &str = "FBUILD_STATE_DIR";

/// Resolved layout of the daemon's per-user state directory
/// (`~/.fbuild/daemon/` by default).
#[derive(Debug, Clone)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the state directory from `FBUILD_STATE_DIR` if set,
    /// otherwise `<home>/.fbuild/daemon`.
    pub fn from_env() -> Result<Self, LayoutError> {
        if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
            return Ok(Self::new(dir));
        }
        let home = dirs::home_dir().ok_or(LayoutError::NoHomeDir)?;
        Ok(Self::new(home.join(".fbuild").join("daemon")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pid_file(&self) -> PathBuf {
        self.root.join("fbuild_daemon.pid")
    }

    pub fn daemon_status_file(&self) -> PathBuf {
        self.root.join("daemon_status.json")
    }

    pub fn request_status_file(&self, request_id: &str) -> PathBuf {
        self.root.join(format!("status_{request_id}.json"))
    }

    pub fn inbox_dir(&self) -> PathBuf {
        self.root.join("inbox")
    }

    pub fn inbox_request_file(&self, request_id: &str) -> PathBuf {
        self.inbox_dir().join(format!("request_{request_id}.json"))
    }

    pub fn rejected_dir(&self) -> PathBuf {
        self.root.join("rejected")
    }

    pub fn rejected_request_file(&self, request_id: &str) -> PathBuf {
        self.rejected_dir().join(format!("request_{request_id}.json"))
    }

    pub fn registry_file(&self) -> PathBuf {
        self.root.join("process_registry.json")
    }

    pub fn shutdown_signal_file(&self) -> PathBuf {
        self.root.join("shutdown.signal")
    }

    pub fn cancel_signal_file(&self, request_id: &str) -> PathBuf {
        self.root.join(format!("cancel_{request_id}.signal"))
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join("daemon.log")
    }

    /// Creates the root, inbox and rejected directories if they don't
    /// already exist. Safe to call repeatedly.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.inbox_dir())?;
        std::fs::create_dir_all(self.rejected_dir())?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("could not determine the current user's home directory")]
    NoHomeDir,
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
