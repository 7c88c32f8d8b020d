// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status Store: the daemon's headline status plus one status file per
//! in-flight request, so concurrent clients each watch their own
//! operation without racing a single shared snapshot.

use crate::error::StorageError;
use crate::snapshot::SnapshotStore;
use fbuild_core::DaemonStatus;
use std::path::{Path, PathBuf};

/// Reads a status for a daemon that isn't running / hasn't published yet.
fn missing_status() -> DaemonStatus {
    DaemonStatus {
        state: fbuild_core::DaemonState::Unknown,
        message: "no daemon status available".to_string(),
        updated_at: 0.0,
        operation_in_progress: false,
        daemon_pid: None,
        daemon_started_at: None,
        caller_pid: None,
        caller_cwd: None,
        request_id: None,
        request_started_at: None,
        environment: None,
        project_dir: None,
        current_operation: None,
        operation_type: None,
        output_lines: Vec::new(),
        exit_code: None,
        port: None,
    }
}

pub struct StatusStore {
    state_dir: PathBuf,
    global: SnapshotStore<DaemonStatus>,
}

impl StatusStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        let global = SnapshotStore::new(state_dir.join("daemon_status.json"));
        Self { state_dir, global }
    }

    fn per_request_path(&self, request_id: &str) -> PathBuf {
        self.state_dir.join(format!("status_{request_id}.json"))
    }

    /// Reads the aggregate status, falling back to a synthetic "unknown"
    /// status (never an error) when nothing has been published yet, and
    /// to the same synthetic status when the snapshot has gone stale.
    pub fn read_global(&self, stale_after: f64) -> DaemonStatus {
        match self.global.load() {
            Some(status) if !status.is_stale(stale_after) => status,
            Some(mut stale) => {
                stale.state = fbuild_core::DaemonState::Unknown;
                stale
            }
            None => missing_status(),
        }
    }

    pub fn write_global(&self, status: &DaemonStatus) -> Result<(), StorageError> {
        self.global.save(status)
    }

    pub fn read_request(&self, request_id: &str, stale_after: f64) -> DaemonStatus {
        let store: SnapshotStore<DaemonStatus> =
            SnapshotStore::new(self.per_request_path(request_id));
        match store.load() {
            Some(status) if !status.is_stale(stale_after) => status,
            Some(mut stale) => {
                stale.state = fbuild_core::DaemonState::Unknown;
                stale
            }
            None => missing_status(),
        }
    }

    pub fn write_request(
        &self,
        request_id: &str,
        status: &DaemonStatus,
    ) -> Result<(), StorageError> {
        let store: SnapshotStore<DaemonStatus> =
            SnapshotStore::new(self.per_request_path(request_id));
        store.save(status)
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }
}

#[cfg(test)]
#[path = "status_store_tests.rs"]
mod tests;
