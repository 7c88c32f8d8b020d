// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tears down a tracked process tree in three phases: snapshot the current
//! descendants, ask nicely (SIGTERM, leaves first), then force the issue
//! (SIGKILL) on anything still standing after a bounded grace period.

use crate::sysutil;
use fbuild_core::ProcessTreeInfo;
use std::time::{Duration, Instant};
use sysinfo::{Pid, Signal};
use tracing::{info, warn};

pub struct ProcessTreeSupervisor {
    kill_grace: Duration,
    /// The daemon's own pid and its parent's — the supervisor refuses to
    /// sign either's death warrant even if a caller hands it a matching
    /// tree by mistake.
    protected: Vec<u32>,
}

impl ProcessTreeSupervisor {
    pub fn new(kill_grace: Duration) -> Self {
        let self_pid = std::process::id();
        let mut protected = vec![self_pid];

        let system = sysutil::refreshed_system();
        if let Some(process) = system.process(Pid::from_u32(self_pid)) {
            if let Some(parent) = process.parent() {
                protected.push(parent.as_u32());
            }
        }

        Self { kill_grace, protected }
    }

    /// Kills the tree rooted at `info.root_pid`. Safe to call more than
    /// once on the same entry, and safe to call on a tree that has already
    /// exited entirely — both are no-ops.
    pub async fn kill_tree(&self, info: &ProcessTreeInfo) {
        let root_pid = info.root_pid;
        let stored_children = info.child_pids.clone();
        let protected = self.protected.clone();
        let grace = self.kill_grace;

        let outcome = tokio::task::spawn_blocking(move || {
            Self::kill_tree_blocking(root_pid, stored_children, &protected, grace)
        })
        .await;

        if let Err(join_err) = outcome {
            warn!(root_pid, "supervisor kill task did not complete: {join_err}");
        }
    }

    fn kill_tree_blocking(root_pid: u32, stored_children: Vec<u32>, protected: &[u32], grace: Duration) {
        let system = sysutil::refreshed_system();

        // Descendants may have spawned since the registry was last
        // refreshed, so walk the tree again rather than trusting only the
        // stored snapshot.
        let mut targets = sysutil::descendants_of(&system, root_pid);
        for pid in stored_children {
            if !targets.contains(&pid) {
                targets.push(pid);
            }
        }
        targets.push(root_pid);
        targets.retain(|pid| !protected.contains(pid));
        targets.dedup();

        if targets.is_empty() {
            return;
        }

        let ordered = sysutil::leaves_first(&system, &targets);
        for &pid in &ordered {
            if sysutil::is_alive(&system, pid) {
                info!(pid, "sending SIGTERM");
                sysutil::send_signal(&system, pid, Signal::Term);
            }
        }

        let mut system = system;
        let mut live = ordered;
        let deadline = Instant::now() + grace;
        while !live.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
            sysutil::refresh_pids(&mut system, &live);
            live.retain(|&pid| sysutil::is_alive(&system, pid));
        }

        if live.is_empty() {
            return;
        }

        sysutil::refresh_pids(&mut system, &live);
        for &pid in &live {
            if sysutil::is_alive(&system, pid) {
                warn!(pid, "did not exit after SIGTERM within grace period, sending SIGKILL");
                sysutil::send_signal(&system, pid, Signal::Kill);
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
