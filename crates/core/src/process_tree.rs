// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shape of one entry in the process registry: a client PID and the
//! snapshot of the process tree it owns.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// A tracked process tree: the client that requested the operation, the
/// root process the daemon spawned for it, and the descendants discovered
/// on the last refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessTreeInfo {
    pub client_pid: u32,
    pub root_pid: u32,
    #[serde(default)]
    pub child_pids: Vec<u32>,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub project_dir: String,
    #[serde(default)]
    pub operation_type: String,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default = "now_secs")]
    pub started_at: f64,
    #[serde(default = "now_secs")]
    pub last_updated: f64,
}

impl ProcessTreeInfo {
    pub fn new(client_pid: u32, root_pid: u32) -> Self {
        let started_at = now_secs();
        Self {
            client_pid,
            root_pid,
            child_pids: Vec::new(),
            request_id: String::new(),
            project_dir: String::new(),
            operation_type: String::new(),
            port: None,
            started_at,
            last_updated: started_at,
        }
    }

    /// All PIDs this entry covers, root included. Order is unspecified;
    /// callers that need a kill order derive it separately (see
    /// `fbuild-daemon::supervisor`).
    pub fn all_pids(&self) -> Vec<u32> {
        let mut pids = self.child_pids.clone();
        pids.push(self.root_pid);
        pids
    }
}

#[cfg(test)]
#[path = "process_tree_tests.rs"]
mod tests;
