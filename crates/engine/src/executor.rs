// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives a single deploy or monitor request from pickup to a terminal
//! status, publishing progress through a [`StatusSink`] as it goes.

use crate::error::ExecutorError;
use crate::ring::OutputRing;
use fbuild_adapters::{DeployAdapter, DeployContext, DeployOutputSink, MonitorAdapter};
use fbuild_core::{DaemonState, OperationKind};
use regex::Regex;
use std::path::PathBuf;
use std::time::Duration;

/// Where the executor is in its lifecycle. Mirrors the `DaemonState`
/// values a status-store write can observe mid-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Pending,
    Acquiring,
    Running,
    /// Deploy only: the brief prep step between acquiring resources and
    /// handing the artifact to the flasher (clean / locate-artifact). The
    /// build itself is an out-of-scope collaborator (see the compiler
    /// non-goal), but clients still see this as a distinct headline state.
    Building,
    Finalizing,
    Completed,
    Failed,
    Canceled,
}

impl ExecutorState {
    pub fn as_daemon_state(&self, kind: OperationKind) -> DaemonState {
        match self {
            Self::Pending | Self::Acquiring => DaemonState::Idle,
            Self::Building => DaemonState::Building,
            Self::Running | Self::Finalizing => match kind {
                OperationKind::Monitor => DaemonState::Monitoring,
                OperationKind::Deploy | OperationKind::BuildAndDeploy => DaemonState::Deploying,
            },
            Self::Completed => DaemonState::Completed,
            Self::Failed | Self::Canceled => DaemonState::Failed,
        }
    }
}

/// Final result of a terminated operation.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub state: ExecutorState,
    pub exit_code: Option<i32>,
    pub output_lines: Vec<String>,
    pub message: String,
}

/// Receives state transitions and output lines as the executor runs, so a
/// caller can mirror them into the status store without the executor
/// knowing anything about persistence.
pub trait StatusSink: Send {
    fn on_state(&mut self, state: ExecutorState);
    fn on_line(&mut self, line: &str);

    /// Called once a deploy's flasher process has been spawned, before
    /// its output starts streaming. Most callers don't need this (hence
    /// the default no-op); the daemon loop uses it to register the pid
    /// with the process registry before the tree can orphan.
    fn on_spawn(&mut self, _pid: u32) {}
}

/// A [`StatusSink`] that does nothing, for callers (and tests) that only
/// care about the final [`OperationOutcome`].
pub struct NullSink;

impl StatusSink for NullSink {
    fn on_state(&mut self, _state: ExecutorState) {}
    fn on_line(&mut self, _line: &str) {}
}

/// Polled before and during a run to ask whether the operation was
/// canceled (client disconnected / daemon is shutting down).
pub trait CancelSignal: Send {
    fn is_canceled(&self) -> bool;
}

impl CancelSignal for () {
    fn is_canceled(&self) -> bool {
        false
    }
}

/// Parameters for a single deploy run, already resolved from the request
/// and the project's `fbuild.toml` environment.
pub struct DeployPlan {
    pub project_dir: PathBuf,
    pub environment: String,
    pub port: Option<String>,
    pub artifact_path: PathBuf,
    pub monitor_after: bool,
    pub halt_on_error: Option<String>,
    pub halt_on_success: Option<String>,
    pub monitor_timeout: Duration,
    pub baud_rate: u32,
}

/// Parameters for a single monitor run.
pub struct MonitorPlan {
    pub port: String,
    pub baud_rate: u32,
    pub halt_on_error: Option<String>,
    pub halt_on_success: Option<String>,
    pub timeout: Duration,
}

/// Bridges the adapter-facing [`DeployOutputSink`] to the executor's own
/// [`StatusSink`] and output ring, so `run_deploy` doesn't need two
/// separate mutable borrows of `sink` alive at once.
struct ExecutorDeploySink<'a> {
    sink: &'a mut dyn StatusSink,
    ring: &'a mut OutputRing,
}

impl DeployOutputSink for ExecutorDeploySink<'_> {
    fn on_spawn(&mut self, pid: u32) {
        self.sink.on_spawn(pid);
    }

    fn on_line(&mut self, line: String) {
        self.sink.on_line(&line);
        self.ring.push(line);
    }
}

/// Drives exactly one operation (deploy, optionally followed by a
/// post-flash monitor session, or a standalone monitor) to completion.
pub struct OperationExecutor<D, M> {
    deploy: D,
    monitor: M,
    ring_capacity: usize,
}

impl<D, M> OperationExecutor<D, M>
where
    D: DeployAdapter,
    M: MonitorAdapter,
{
    pub fn new(deploy: D, monitor: M, ring_capacity: usize) -> Self {
        Self {
            deploy,
            monitor,
            ring_capacity,
        }
    }

    pub async fn run_deploy(
        &self,
        plan: &DeployPlan,
        sink: &mut dyn StatusSink,
        cancel: &dyn CancelSignal,
    ) -> Result<OperationOutcome, ExecutorError> {
        if cancel.is_canceled() {
            return Ok(canceled_outcome());
        }
        sink.on_state(ExecutorState::Running);

        // The artifact is already resolved by `plan` (clean/locate-artifact
        // ran ahead of dispatch), but clients still watch this as its own
        // headline state before the flash itself starts streaming output.
        sink.on_state(ExecutorState::Building);
        if cancel.is_canceled() {
            return Ok(canceled_outcome());
        }
        sink.on_state(ExecutorState::Running);

        let mut ring = OutputRing::new(self.ring_capacity);
        let ctx = DeployContext {
            project_dir: plan.project_dir.clone(),
            environment: plan.environment.clone(),
            port: plan.port.clone(),
            artifact_path: plan.artifact_path.clone(),
        };

        let mut deploy_sink = ExecutorDeploySink {
            sink: &mut *sink,
            ring: &mut ring,
        };
        let outcome = self.deploy.flash(&ctx, &mut deploy_sink).await?;

        if !outcome.succeeded() {
            sink.on_state(ExecutorState::Failed);
            return Ok(OperationOutcome {
                state: ExecutorState::Failed,
                exit_code: Some(outcome.exit_code),
                output_lines: ring.lines(),
                message: format!("flash exited with status {}", outcome.exit_code),
            });
        }

        if !plan.monitor_after {
            sink.on_state(ExecutorState::Completed);
            return Ok(OperationOutcome {
                state: ExecutorState::Completed,
                exit_code: Some(outcome.exit_code),
                output_lines: ring.lines(),
                message: "flash succeeded".to_string(),
            });
        }

        let Some(port) = plan.port.clone() else {
            sink.on_state(ExecutorState::Completed);
            return Ok(OperationOutcome {
                state: ExecutorState::Completed,
                exit_code: Some(outcome.exit_code),
                output_lines: ring.lines(),
                message: "flash succeeded; no port configured for post-flash monitor".to_string(),
            });
        };

        sink.on_state(ExecutorState::Finalizing);
        let monitor_plan = MonitorPlan {
            port,
            baud_rate: plan.baud_rate,
            halt_on_error: plan.halt_on_error.clone(),
            halt_on_success: plan.halt_on_success.clone(),
            timeout: plan.monitor_timeout,
        };
        self.run_monitor_inner(&monitor_plan, sink, cancel, ring).await
    }

    pub async fn run_monitor(
        &self,
        plan: &MonitorPlan,
        sink: &mut dyn StatusSink,
        cancel: &dyn CancelSignal,
    ) -> Result<OperationOutcome, ExecutorError> {
        if cancel.is_canceled() {
            return Ok(canceled_outcome());
        }
        sink.on_state(ExecutorState::Running);
        let ring = OutputRing::new(self.ring_capacity);
        self.run_monitor_inner(plan, sink, cancel, ring).await
    }

    async fn run_monitor_inner(
        &self,
        plan: &MonitorPlan,
        sink: &mut dyn StatusSink,
        cancel: &dyn CancelSignal,
        mut ring: OutputRing,
    ) -> Result<OperationOutcome, ExecutorError> {
        let halt_error = compile_halt_pattern(plan.halt_on_error.as_deref());
        let halt_success = compile_halt_pattern(plan.halt_on_success.as_deref());

        let mut session = self.monitor.open(&plan.port, plan.baud_rate).await?;
        let deadline = tokio::time::Instant::now() + plan.timeout;
        let read_window = Duration::from_millis(500);

        loop {
            if cancel.is_canceled() {
                sink.on_state(ExecutorState::Canceled);
                return Ok(OperationOutcome {
                    state: ExecutorState::Canceled,
                    exit_code: None,
                    output_lines: ring.lines(),
                    message: "monitor canceled".to_string(),
                });
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                if halt_error.is_some() || halt_success.is_some() {
                    sink.on_state(ExecutorState::Failed);
                    return Ok(OperationOutcome {
                        state: ExecutorState::Failed,
                        exit_code: None,
                        output_lines: ring.lines(),
                        message: "pattern not found".to_string(),
                    });
                }
                sink.on_state(ExecutorState::Completed);
                return Ok(OperationOutcome {
                    state: ExecutorState::Completed,
                    exit_code: None,
                    output_lines: ring.lines(),
                    message: "timed monitoring session".to_string(),
                });
            }

            let window = read_window.min(deadline - now);
            let line = session.read_line(window).await?;
            let Some(line) = line else {
                continue;
            };
            sink.on_line(&line);
            ring.push(line.clone());

            if let Some(pattern) = &halt_error {
                if pattern.is_match(&line) {
                    sink.on_state(ExecutorState::Failed);
                    return Ok(OperationOutcome {
                        state: ExecutorState::Failed,
                        exit_code: None,
                        output_lines: ring.lines(),
                        message: format!("halt-on-error pattern matched: {line}"),
                    });
                }
            }
            if let Some(pattern) = &halt_success {
                if pattern.is_match(&line) {
                    sink.on_state(ExecutorState::Completed);
                    return Ok(OperationOutcome {
                        state: ExecutorState::Completed,
                        exit_code: None,
                        output_lines: ring.lines(),
                        message: format!("halt-on-success pattern matched: {line}"),
                    });
                }
            }
        }
    }
}

fn compile_halt_pattern(pattern: Option<&str>) -> Option<Regex> {
    pattern.and_then(|p| regex::RegexBuilder::new(p).case_insensitive(true).build().ok())
}

fn canceled_outcome() -> OperationOutcome {
    OperationOutcome {
        state: ExecutorState::Canceled,
        exit_code: None,
        output_lines: Vec::new(),
        message: "operation canceled before it started".to_string(),
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
