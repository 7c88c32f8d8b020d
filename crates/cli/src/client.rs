// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's only client, talking to it purely through the state
//! directory: no socket, no handshake. Starting, submitting, polling and
//! stopping the daemon are all file operations plus a process spawn.

use crate::error::ClientError;
use fbuild_core::{DaemonState, DaemonStatus, StateLayout};
use fbuild_daemon::{read_pid, InboundRequest, RequestInbox};
use fbuild_storage::StatusStore;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::process::Command;

/// Same prefix `fbuildd` writes to its log before doing anything else (see
/// `crates/daemon/src/main.rs`), so a client that just spawned the daemon
/// can tell this attempt's output from a previous run's.
const STARTUP_MARKER_PREFIX: &str = "--- fbuildd: starting (pid: ";
const STARTUP_ERROR_PREFIX: &str = "ERROR failed to start fbuildd: ";

fn pid_is_alive(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true);
    system.process(Pid::from_u32(pid)).is_some()
}

/// Finds the error line, if any, logged after the most recent startup
/// marker. A daemon that started cleanly never writes this line.
fn parse_startup_error(log: &str) -> Option<String> {
    let last_marker = log.rfind(STARTUP_MARKER_PREFIX)?;
    log[last_marker..]
        .lines()
        .find_map(|line| line.strip_prefix(STARTUP_ERROR_PREFIX))
        .map(str::to_string)
}

/// What happened when the client asked the daemon to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// No daemon was running.
    NotRunning,
    /// The daemon exited within the grace period.
    Stopped,
    /// The shutdown signal was sent but the daemon didn't exit in time.
    TimedOut,
}

/// How a wait for a request's completion ended.
#[derive(Debug)]
pub enum WaitOutcome {
    /// The request reached a terminal state (or went stale mid-flight).
    Terminal(DaemonStatus),
    /// The caller chose to keep the operation running in the background.
    Detached,
    /// The caller chose to cancel; the cancel signal has been sent but the
    /// daemon hasn't necessarily observed it yet.
    Canceled,
}

/// Reads one line of y/n input from the terminal. Defaults to "no" on any
/// I/O failure so an unattended or piped invocation doesn't hang.
fn prompt_keep_running_in_background() -> bool {
    use std::io::Write;
    print!("\nkeep running in background? [y/N] ");
    let _ = std::io::stdout().flush();
    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub struct Client {
    layout: StateLayout,
    status: StatusStore,
    inbox: RequestInbox,
    stale_seconds: f64,
}

impl Client {
    pub fn new(layout: StateLayout) -> Self {
        let status = StatusStore::new(layout.root());
        let inbox = RequestInbox::new(layout.clone());
        Self {
            layout,
            status,
            inbox,
            stale_seconds: fbuild_core::DEFAULT_STALE_SECONDS,
        }
    }

    fn daemon_is_running(&self) -> bool {
        read_pid(&self.layout.pid_file()).is_some_and(pid_is_alive)
    }

    /// Reads the daemon's own headline status (not a specific request).
    pub fn daemon_status(&self) -> DaemonStatus {
        self.status.read_global(self.stale_seconds)
    }

    /// Starts `fbuildd` if it isn't already running and waits until its
    /// status moves off `unknown`, or until the startup log names a
    /// failure. A daemon that's already up is a no-op.
    pub async fn ensure_daemon_running(&self, fbuildd_path: &Path) -> Result<(), ClientError> {
        if self.daemon_is_running() {
            return Ok(());
        }

        self.layout.ensure_dirs()?;
        let log_path = self.layout.log_file();
        let start_offset = std::fs::metadata(&log_path).map(|m| m.len()).unwrap_or(0);

        Command::new(fbuildd_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(ClientError::Spawn)?;

        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Ok(content) = std::fs::read_to_string(&log_path) {
                if content.len() as u64 >= start_offset {
                    if let Some(message) = parse_startup_error(&content[start_offset as usize..]) {
                        return Err(ClientError::StartupFailed(message));
                    }
                }
            }

            let status = self.daemon_status();
            if status.state != DaemonState::Unknown {
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(ClientError::StartupTimeout);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Writes a request into the inbox and returns immediately; the caller
    /// polls the resulting status with [`Client::poll_until_terminal`].
    pub fn submit(&self, request: &InboundRequest) -> Result<(), ClientError> {
        self.layout.ensure_dirs()?;
        self.inbox.submit(request)?;
        Ok(())
    }

    /// Polls this request's status until it reaches a terminal state,
    /// invoking `on_message` once per distinct message seen so far, while
    /// also watching for Ctrl-C. On interrupt, prompts to keep the
    /// operation running in the background; answering no touches the
    /// request's cancel signal and returns immediately.
    pub async fn wait_for_request(
        &self,
        request_id: &str,
        poll_interval: Duration,
        mut on_message: impl FnMut(&DaemonStatus),
    ) -> WaitOutcome {
        let mut last_message = String::new();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    if prompt_keep_running_in_background() {
                        return WaitOutcome::Detached;
                    }
                    let _ = self.cancel(request_id);
                    return WaitOutcome::Canceled;
                }
                _ = tokio::time::sleep(poll_interval) => {}
            }

            let status = self.status.read_request(request_id, self.stale_seconds);
            if status.message != last_message {
                on_message(&status);
                last_message = status.message.clone();
            }
            match status.state {
                DaemonState::Completed | DaemonState::Failed => return WaitOutcome::Terminal(status),
                DaemonState::Unknown if !last_message.is_empty() => {
                    return WaitOutcome::Terminal(status)
                }
                _ => {}
            }
        }
    }

    /// Touches this request's cancel signal file; the daemon removes it
    /// once observed.
    pub fn cancel(&self, request_id: &str) -> Result<(), ClientError> {
        fbuild_wire::touch(&self.layout.cancel_signal_file(request_id))?;
        Ok(())
    }

    /// Touches `shutdown.signal` and waits for the daemon's pid to
    /// disappear. Calling this when no daemon is running is a no-op.
    pub async fn stop_daemon(&self) -> Result<StopOutcome, ClientError> {
        let Some(pid) = read_pid(&self.layout.pid_file()) else {
            return Ok(StopOutcome::NotRunning);
        };
        if !pid_is_alive(pid) {
            let _ = std::fs::remove_file(self.layout.pid_file());
            return Ok(StopOutcome::NotRunning);
        }

        fbuild_wire::touch(&self.layout.shutdown_signal_file())?;

        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if !pid_is_alive(pid) {
                return Ok(StopOutcome::Stopped);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Ok(StopOutcome::TimedOut)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
