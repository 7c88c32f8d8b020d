// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracks every process tree the daemon has spawned on behalf of a client,
//! persisted so a restarted daemon can still find (and clean up) trees it
//! spawned before it died.

use crate::error::RegistryError;
use crate::sysutil;
use fbuild_core::ProcessTreeInfo;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Thread-safe map of `client_pid -> ProcessTreeInfo`, backed by a JSON
/// file rewritten atomically after every mutation. All operations take the
/// same mutex, so registration and a concurrent refresh never interleave.
pub struct ProcessRegistry {
    path: PathBuf,
    entries: Mutex<HashMap<u32, ProcessTreeInfo>>,
}

impl ProcessRegistry {
    /// Loads the registry file at `path` if it exists and is well-formed;
    /// otherwise starts empty. A corrupt registry file is not an error —
    /// the daemon just forgets whatever trees it can't account for.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = fbuild_wire::read_json_lenient::<HashMap<u32, ProcessTreeInfo>>(&path)
            .unwrap_or_default();
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &self,
        client_pid: u32,
        root_pid: u32,
        request_id: &str,
        project_dir: &str,
        operation_type: &str,
        port: Option<String>,
    ) -> Result<(), RegistryError> {
        let mut entry = ProcessTreeInfo::new(client_pid, root_pid);
        entry.request_id = request_id.to_string();
        entry.project_dir = project_dir.to_string();
        entry.operation_type = operation_type.to_string();
        entry.port = port;

        let system = sysutil::refreshed_system();
        entry.child_pids = sysutil::descendants_of(&system, root_pid);
        entry.last_updated = now_secs();

        self.entries.lock().insert(client_pid, entry);
        self.flush()
    }

    pub fn unregister(&self, client_pid: u32) -> Result<(), RegistryError> {
        self.entries.lock().remove(&client_pid);
        self.flush()
    }

    pub fn get(&self, client_pid: u32) -> Option<ProcessTreeInfo> {
        self.entries.lock().get(&client_pid).cloned()
    }

    /// Re-walks the process tree from each entry's `root_pid`, since
    /// descendants may have been spawned (or exited) since the last scan.
    pub fn refresh_all(&self) {
        let system = sysutil::refreshed_system();
        let mut entries = self.entries.lock();
        let updated_at = now_secs();
        for entry in entries.values_mut() {
            entry.child_pids = sysutil::descendants_of(&system, entry.root_pid);
            entry.last_updated = updated_at;
        }
        drop(entries);
        let _ = self.flush();
    }

    pub fn find_by_port(&self, port: &str) -> Option<ProcessTreeInfo> {
        self.entries
            .lock()
            .values()
            .find(|entry| {
                entry
                    .port
                    .as_deref()
                    .is_some_and(|p| p.eq_ignore_ascii_case(port))
            })
            .cloned()
    }

    pub fn find_by_project(&self, project_dir: &str) -> Option<ProcessTreeInfo> {
        self.entries
            .lock()
            .values()
            .find(|entry| entry.project_dir == project_dir)
            .cloned()
    }

    /// Entries whose owning client is no longer running — candidates the
    /// daemon loop hands to the supervisor for cleanup, since there's no
    /// one left to receive the operation's result.
    pub fn list_dead_clients(&self) -> Vec<ProcessTreeInfo> {
        let system = sysutil::refreshed_system();
        self.entries
            .lock()
            .values()
            .filter(|entry| !sysutil::is_alive(&system, entry.client_pid))
            .cloned()
            .collect()
    }

    pub fn list_all(&self) -> Vec<ProcessTreeInfo> {
        self.entries.lock().values().cloned().collect()
    }

    fn flush(&self) -> Result<(), RegistryError> {
        let entries = self.entries.lock();
        fbuild_wire::write_json_atomic(&self.path, &*entries)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
