// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource Arbiter: serializes access to serial ports and project build
//! directories. Acquisition across both resources is atomic (checked and
//! granted under one lock) so two operations can never deadlock waiting
//! on each other's port/project pair.

use crate::error::ArbiterError;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// A queued acquisition. Granting one transfers busy-set ownership to it
/// directly under the arbiter's lock — the resource is never cleared and
/// left free for a moment, which is what let a brand-new `acquire()` call
/// barge in ahead of an already-queued waiter.
struct Waiter {
    port: Option<String>,
    project_dir: PathBuf,
    tx: oneshot::Sender<()>,
}

#[derive(Default)]
struct ArbiterState {
    busy_ports: HashSet<String>,
    busy_projects: HashSet<PathBuf>,
    /// Single FIFO queue across every pending acquisition, regardless of
    /// which resource(s) it needs. Granting always scans front-to-back, so
    /// among waiters on the same port or project, whichever enqueued first
    /// is always the one handed the resource.
    waiters: VecDeque<Waiter>,
}

impl ArbiterState {
    /// Whether some already-queued waiter wants `port` or `project_dir`.
    /// A new `acquire()` that would otherwise see both resources free must
    /// still queue behind these, or it would jump ahead of an earlier
    /// waiter the instant that waiter's resource is released.
    fn has_conflicting_waiter(&self, port: Option<&str>, project_dir: &PathBuf) -> bool {
        self.waiters
            .iter()
            .any(|w| (port.is_some() && w.port.as_deref() == port) || &w.project_dir == project_dir)
    }

    /// Hands newly-freed resources directly to the earliest eligible
    /// queued waiter, repeating until a full scan grants nothing further.
    /// If a granted waiter's receiver is already gone (it timed out before
    /// we got here), the tentative grant is undone and the scan continues
    /// so that lost wakeup doesn't strand the resource or starve the next
    /// waiter in line.
    fn drain_waiters(&mut self) {
        loop {
            let Some(pos) = self.waiters.iter().position(|w| {
                let port_free = w.port.as_ref().is_none_or(|p| !self.busy_ports.contains(p));
                let project_free = !self.busy_projects.contains(&w.project_dir);
                port_free && project_free
            }) else {
                break;
            };

            let waiter = self.waiters.remove(pos).expect("position just checked");
            if let Some(port) = &waiter.port {
                self.busy_ports.insert(port.clone());
            }
            self.busy_projects.insert(waiter.project_dir.clone());

            if waiter.tx.send(()).is_err() {
                // Waiter already timed out and dropped its receiver; undo
                // the tentative grant and keep scanning for the next
                // eligible entry instead of leaving the resource busy for
                // no one.
                if let Some(port) = &waiter.port {
                    self.busy_ports.remove(port);
                }
                self.busy_projects.remove(&waiter.project_dir);
            }
        }
    }
}

/// Canonicalizes a port identifier for set membership (case-insensitive
/// on platforms where port names are, e.g. Windows `COM7`/`com7`).
fn canonical_port(port: &str) -> String {
    port.to_ascii_lowercase()
}

/// Serializes access to (serial port, project directory) pairs.
#[derive(Clone)]
pub struct ResourceArbiter {
    state: Arc<Mutex<ArbiterState>>,
}

impl Default for ResourceArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceArbiter {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ArbiterState::default())),
        }
    }

    /// Attempts to acquire `port` (if any) and `project_dir` together,
    /// waiting up to `timeout` for both to become free. Returns a guard
    /// that releases both resources (handing them straight to the next
    /// FIFO waiter on each, if any) when dropped or explicitly released.
    pub async fn acquire(
        &self,
        port: Option<&str>,
        project_dir: &PathBuf,
        timeout: Duration,
    ) -> Result<ResourceGuard, ArbiterError> {
        let port = port.map(canonical_port);

        let rx = {
            let mut state = self.state.lock();
            let port_free = port.as_ref().is_none_or(|p| !state.busy_ports.contains(p));
            let project_free = !state.busy_projects.contains(project_dir);

            if port_free && project_free && !state.has_conflicting_waiter(port.as_deref(), project_dir) {
                if let Some(p) = &port {
                    state.busy_ports.insert(p.clone());
                }
                state.busy_projects.insert(project_dir.clone());
                return Ok(ResourceGuard {
                    state: self.state.clone(),
                    port,
                    project_dir: project_dir.clone(),
                    released: false,
                });
            }

            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(Waiter {
                port: port.clone(),
                project_dir: project_dir.clone(),
                tx,
            });
            rx
        };

        // On timeout, returning here drops `rx`. A concurrent
        // `drain_waiters` that later tries to grant this entry will see
        // `send` fail, undo the tentative grant, and move on to the next
        // eligible waiter instead of losing the wakeup silently.
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(())) => Ok(ResourceGuard {
                state: self.state.clone(),
                port,
                project_dir: project_dir.clone(),
                released: false,
            }),
            _ => Err(ArbiterError::Timeout),
        }
    }
}

/// Holds exclusive access to a (port, project) pair until dropped.
pub struct ResourceGuard {
    state: Arc<Mutex<ArbiterState>>,
    port: Option<String>,
    project_dir: PathBuf,
    released: bool,
}

impl ResourceGuard {
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let mut state = self.state.lock();
        if let Some(port) = &self.port {
            state.busy_ports.remove(port);
        }
        state.busy_projects.remove(&self.project_dir);
        state.drain_waiters();
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
#[path = "arbiter_tests.rs"]
mod tests;
