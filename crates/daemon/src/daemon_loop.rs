// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties every other module in this crate together into the daemon's main
//! loop: scan the inbox, dispatch onto a bounded worker pool, refresh the
//! process registry and sweep orphaned trees on a slower cadence, and
//! publish status as each operation progresses.

use crate::error::DaemonError;
use crate::inbox::{self, InboundRequest, RequestInbox};
use crate::plan;
use crate::registry::ProcessRegistry;
use crate::supervisor::ProcessTreeSupervisor;
use crate::sysutil;
use crate::DaemonConfig;
use fbuild_adapters::{DeployAdapter, MonitorAdapter};
use fbuild_config::ProjectConfig;
use fbuild_core::{DaemonState, DaemonStatus, OperationKind, StateLayout};
use fbuild_engine::{
    CancelSignal, ExecutorState, OperationExecutor, OutputRing, StatusSink,
};
use fbuild_storage::StatusStore;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex as AsyncMutex, Semaphore};
use tracing::{error, info, warn};

const RING_CAPACITY: usize = 100;

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Watches a request's cancel signal file. Cheap enough to poll every
/// loop iteration of a running operation; the daemon deletes the file
/// once it has acted on it.
struct FileCancelSignal {
    path: PathBuf,
}

impl CancelSignal for FileCancelSignal {
    fn is_canceled(&self) -> bool {
        self.path.exists()
    }
}

/// Bridges the executor's [`StatusSink`] callbacks to the status store and
/// process registry, so the executor itself stays ignorant of either.
struct LiveStatusSink {
    status: Arc<StatusStore>,
    registry: Arc<ProcessRegistry>,
    request_id: String,
    operation_type: OperationKind,
    environment: String,
    project_dir: String,
    port: Option<String>,
    caller_pid: u32,
    caller_cwd: String,
    client_pid: u32,
    request_started_at: f64,
    daemon_pid: u32,
    daemon_started_at: f64,
    ring: OutputRing,
    last_state: ExecutorState,
}

impl LiveStatusSink {
    #[allow(clippy::too_many_arguments)]
    fn new(
        status: Arc<StatusStore>,
        registry: Arc<ProcessRegistry>,
        request: &InboundRequest,
        environment: String,
        port: Option<String>,
        daemon_pid: u32,
        daemon_started_at: f64,
    ) -> Self {
        Self {
            status,
            registry,
            request_id: request.request_id().to_string(),
            operation_type: request.kind(),
            environment,
            project_dir: request.project_dir().to_string(),
            port,
            caller_pid: request.caller_pid(),
            caller_cwd: request.caller_cwd().to_string(),
            client_pid: request.caller_pid(),
            request_started_at: now_secs(),
            daemon_pid,
            daemon_started_at,
            ring: OutputRing::new(RING_CAPACITY),
            last_state: ExecutorState::Pending,
        }
    }

    fn snapshot(&self, current_operation: &str) -> DaemonStatus {
        let state = self.last_state.as_daemon_state(self.operation_type);
        DaemonStatus {
            state,
            message: current_operation.to_string(),
            updated_at: now_secs(),
            operation_in_progress: !matches!(
                self.last_state,
                ExecutorState::Completed | ExecutorState::Failed | ExecutorState::Canceled
            ),
            daemon_pid: Some(self.daemon_pid),
            daemon_started_at: Some(self.daemon_started_at),
            caller_pid: Some(self.caller_pid),
            caller_cwd: Some(self.caller_cwd.clone()),
            request_id: Some(self.request_id.clone()),
            request_started_at: Some(self.request_started_at),
            environment: Some(self.environment.clone()),
            project_dir: Some(self.project_dir.clone()),
            current_operation: Some(current_operation.to_string()),
            operation_type: Some(self.operation_type),
            output_lines: self.ring.lines(),
            exit_code: None,
            port: self.port.clone(),
        }
    }

    fn publish(&self, current_operation: &str) {
        let status = self.snapshot(current_operation);
        if let Err(err) = self.status.write_request(&self.request_id, &status) {
            warn!(request_id = %self.request_id, "failed to write request status: {err}");
        }
        if let Err(err) = self.status.write_global(&status) {
            warn!(request_id = %self.request_id, "failed to write global status: {err}");
        }
    }
}

impl StatusSink for LiveStatusSink {
    fn on_state(&mut self, state: ExecutorState) {
        self.last_state = state;
        let label = match state {
            ExecutorState::Pending => "pending",
            ExecutorState::Acquiring => "acquiring resources",
            ExecutorState::Building => "building",
            ExecutorState::Running => match self.operation_type {
                OperationKind::Monitor => "monitoring",
                OperationKind::Deploy | OperationKind::BuildAndDeploy => "flashing",
            },
            ExecutorState::Finalizing => "starting post-flash monitor",
            ExecutorState::Completed => "completed",
            ExecutorState::Failed => "failed",
            ExecutorState::Canceled => "canceled",
        };
        self.publish(label);
    }

    fn on_line(&mut self, line: &str) {
        self.ring.push(line.to_string());
        self.publish("streaming output");
    }

    fn on_spawn(&mut self, pid: u32) {
        if let Err(err) = self.registry.register(
            self.client_pid,
            pid,
            &self.request_id,
            &self.project_dir,
            self.operation_type.as_str(),
            self.port.clone(),
        ) {
            warn!(pid, "failed to register spawned process tree: {err}");
        }
    }
}

/// Runs the daemon's scan/dispatch/sweep loop until a shutdown signal
/// appears. Generic over the deploy and monitor adapters so tests can
/// swap in fakes without touching the scheduling logic.
pub struct DaemonLoop<D, M> {
    layout: StateLayout,
    config: DaemonConfig,
    inbox: Arc<RequestInbox>,
    registry: Arc<ProcessRegistry>,
    arbiter: fbuild_engine::ResourceArbiter,
    supervisor: Arc<ProcessTreeSupervisor>,
    status: Arc<StatusStore>,
    executor: Arc<OperationExecutor<D, M>>,
    semaphore: Arc<Semaphore>,
    daemon_pid: u32,
    daemon_started_at: f64,
    completed_ids: Arc<AsyncMutex<HashSet<String>>>,
    tick_count: AtomicU64,
}

impl<D, M> DaemonLoop<D, M>
where
    D: DeployAdapter + 'static,
    M: MonitorAdapter + 'static,
{
    pub fn new(config: DaemonConfig, deploy: D, monitor: M) -> Self {
        let layout = config.layout.clone();
        let registry = Arc::new(ProcessRegistry::load(layout.registry_file()));
        let status = Arc::new(StatusStore::new(layout.root()));
        let daemon_pid = std::process::id();
        let daemon_started_at = now_secs();

        Self {
            inbox: Arc::new(RequestInbox::new(layout.clone())),
            supervisor: Arc::new(ProcessTreeSupervisor::new(config.kill_grace)),
            arbiter: fbuild_engine::ResourceArbiter::new(),
            executor: Arc::new(OperationExecutor::new(deploy, monitor, RING_CAPACITY)),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_operations.max(1))),
            completed_ids: Arc::new(AsyncMutex::new(HashSet::new())),
            tick_count: AtomicU64::new(0),
            layout,
            config,
            registry,
            status,
            daemon_pid,
            daemon_started_at,
        }
    }

    /// Runs until `shutdown.signal` appears, at which point in-flight
    /// operations are canceled and the loop returns.
    pub async fn run(self: Arc<Self>) -> Result<(), DaemonError> {
        self.sweep_dead_clients().await;
        self.status
            .write_global(&DaemonStatus::idle(self.daemon_pid, self.daemon_started_at))?;

        let mut interval = tokio::time::interval(self.config.tick_interval);
        loop {
            interval.tick().await;
            if self.layout.shutdown_signal_file().exists() {
                info!("shutdown signal observed, canceling in-flight operations");
                self.shutdown().await;
                break;
            }
            self.tick().await;
        }
        Ok(())
    }

    async fn tick(&self) {
        for path in self.inbox.scan_pending() {
            self.handle_pending(path).await;
        }

        let count = self.tick_count.fetch_add(1, Ordering::Relaxed);
        if count % self.config.maintenance_every_ticks == 0 {
            self.run_maintenance().await;
        }
    }

    async fn handle_pending(&self, path: PathBuf) {
        let claimed = match self.inbox.claim(&path) {
            Ok(claimed) => claimed,
            Err(err) => {
                warn!("failed to claim inbox entry {}: {err}", path.display());
                return;
            }
        };

        let request = match self.inbox.load(&claimed) {
            Ok(request) => request,
            Err(err) => {
                warn!("failed to parse inbox entry {}: {err}", claimed.display());
                let _ = self.inbox.reject(&claimed);
                return;
            }
        };

        if self.completed_ids.lock().await.contains(request.request_id()) {
            warn!(request_id = request.request_id(), "duplicate request id, rejecting");
            let _ = self.inbox.reject(&claimed);
            self.publish_terminal_status(&request, "duplicate request id already completed", None);
            return;
        }

        let system = sysutil::refreshed_system();
        if let Err(err) = inbox::validate(&request, &system) {
            let message = match &err {
                crate::error::InboxError::DeadCaller(_) => "caller gone".to_string(),
                other => other.to_string(),
            };
            warn!(request_id = request.request_id(), "rejecting request: {message}");
            let _ = self.inbox.reject(&claimed);
            self.publish_terminal_status(&request, &message, None);
            return;
        }

        self.dispatch(claimed, request);
    }

    fn dispatch(&self, claimed: PathBuf, request: InboundRequest) {
        let request_id = request.request_id().to_string();
        let semaphore = self.semaphore.clone();
        let registry = self.registry.clone();
        let status = self.status.clone();
        let executor = self.executor.clone();
        let arbiter = self.arbiter.clone();
        let layout = self.layout.clone();
        let inbox = self.inbox.clone();
        let arbiter_timeout = self.config.arbiter_timeout;
        let daemon_pid = self.daemon_pid;
        let daemon_started_at = self.daemon_started_at;
        let completed_ids = self.completed_ids.clone();

        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };

            let outcome = run_request(
                &request,
                &registry,
                &status,
                &executor,
                &arbiter,
                &layout,
                arbiter_timeout,
                daemon_pid,
                daemon_started_at,
            )
            .await;

            if let Err(err) = &outcome {
                error!(request_id = %request_id, "request execution failed: {err}");
            }

            completed_ids.lock().await.insert(request_id.clone());
            let _ = std::fs::remove_file(layout.cancel_signal_file(&request_id));
            if let Err(err) = inbox.complete(&claimed) {
                warn!(request_id = %request_id, "failed to remove inbox entry: {err}");
            }
        });
    }

    fn publish_terminal_status(&self, request: &InboundRequest, message: &str, exit_code: Option<i32>) {
        let status = DaemonStatus {
            state: DaemonState::Failed,
            message: message.to_string(),
            updated_at: now_secs(),
            operation_in_progress: false,
            daemon_pid: Some(self.daemon_pid),
            daemon_started_at: Some(self.daemon_started_at),
            caller_pid: Some(request.caller_pid()),
            caller_cwd: Some(request.caller_cwd().to_string()),
            request_id: Some(request.request_id().to_string()),
            request_started_at: Some(now_secs()),
            environment: None,
            project_dir: Some(request.project_dir().to_string()),
            current_operation: Some(message.to_string()),
            operation_type: Some(request.kind()),
            output_lines: Vec::new(),
            exit_code,
            port: None,
        };
        let _ = self.status.write_request(request.request_id(), &status);
        let _ = self.status.write_global(&status);
    }

    async fn run_maintenance(&self) {
        self.registry.refresh_all();
        self.sweep_dead_clients().await;
    }

    async fn sweep_dead_clients(&self) {
        for entry in self.registry.list_dead_clients() {
            info!(
                client_pid = entry.client_pid,
                root_pid = entry.root_pid,
                "client is gone, sweeping orphaned process tree"
            );
            self.supervisor.kill_tree(&entry).await;
            if let Err(err) = self.registry.unregister(entry.client_pid) {
                warn!("failed to unregister client {}: {err}", entry.client_pid);
            }
        }
    }

    async fn shutdown(&self) {
        let entries = self.registry.list_all();
        for entry in &entries {
            if !entry.request_id.is_empty() {
                let _ = fbuild_wire::touch(&self.layout.cancel_signal_file(&entry.request_id));
            }
        }
        tokio::time::sleep(self.config.kill_grace).await;
        for entry in self.registry.list_all() {
            self.supervisor.kill_tree(&entry).await;
            let _ = self.registry.unregister(entry.client_pid);
        }
        let _ = std::fs::remove_file(self.layout.shutdown_signal_file());
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_request<D, M>(
    request: &InboundRequest,
    registry: &Arc<ProcessRegistry>,
    status: &Arc<StatusStore>,
    executor: &Arc<OperationExecutor<D, M>>,
    arbiter: &fbuild_engine::ResourceArbiter,
    layout: &StateLayout,
    arbiter_timeout: std::time::Duration,
    daemon_pid: u32,
    daemon_started_at: f64,
) -> Result<(), DaemonError>
where
    D: DeployAdapter,
    M: MonitorAdapter,
{
    let project_dir = Path::new(request.project_dir()).to_path_buf();
    let project_config = ProjectConfig::load(&project_dir)?;

    let environment = match request {
        InboundRequest::Deploy(r) => r.environment.clone(),
        InboundRequest::Monitor(r) => r.environment.clone(),
    };

    let cancel = FileCancelSignal {
        path: layout.cancel_signal_file(request.request_id()),
    };

    match request {
        InboundRequest::Deploy(deploy_request) => {
            let deploy_plan = plan::deploy_plan(deploy_request, &project_config)?;
            let mut sink = LiveStatusSink::new(
                status.clone(),
                registry.clone(),
                request,
                environment,
                deploy_plan.port.clone(),
                daemon_pid,
                daemon_started_at,
            );
            sink.on_state(ExecutorState::Acquiring);

            let port = deploy_plan.port.clone();
            let guard = arbiter.acquire(port.as_deref(), &project_dir, arbiter_timeout).await;
            let guard = match guard {
                Ok(guard) => guard,
                Err(err) => {
                    sink.on_state(ExecutorState::Failed);
                    finalize(status, registry, request, "resource contention timed out", None);
                    return Err(fbuild_engine::ExecutorError::from(err).into());
                }
            };

            let outcome = executor.run_deploy(&deploy_plan, &mut sink, &cancel).await?;
            guard.release();
            finalize_outcome(status, registry, request, &outcome);
        }
        InboundRequest::Monitor(monitor_request) => {
            let monitor_plan = plan::monitor_plan(monitor_request, &project_config)?;
            let mut sink = LiveStatusSink::new(
                status.clone(),
                registry.clone(),
                request,
                environment,
                Some(monitor_plan.port.clone()),
                daemon_pid,
                daemon_started_at,
            );
            sink.on_state(ExecutorState::Acquiring);

            let guard = arbiter
                .acquire(Some(&monitor_plan.port), &project_dir, arbiter_timeout)
                .await;
            let guard = match guard {
                Ok(guard) => guard,
                Err(err) => {
                    sink.on_state(ExecutorState::Failed);
                    finalize(status, registry, request, "resource contention timed out", None);
                    return Err(fbuild_engine::ExecutorError::from(err).into());
                }
            };

            let outcome = executor.run_monitor(&monitor_plan, &mut sink, &cancel).await?;
            guard.release();
            finalize_outcome(status, registry, request, &outcome);
        }
    }

    Ok(())
}

fn finalize_outcome(
    status: &Arc<StatusStore>,
    registry: &Arc<ProcessRegistry>,
    request: &InboundRequest,
    outcome: &fbuild_engine::OperationOutcome,
) {
    finalize(status, registry, request, &outcome.message, outcome.exit_code);
}

fn finalize(
    status: &Arc<StatusStore>,
    registry: &Arc<ProcessRegistry>,
    request: &InboundRequest,
    message: &str,
    exit_code: Option<i32>,
) {
    let _ = registry.unregister(request.caller_pid());
    let daemon_status = status.read_request(request.request_id(), f64::MAX);
    let final_status = DaemonStatus {
        message: message.to_string(),
        updated_at: now_secs(),
        operation_in_progress: false,
        exit_code,
        ..daemon_status
    };
    let _ = status.write_request(request.request_id(), &final_status);
    let _ = status.write_global(&final_status);
}

#[cfg(test)]
#[path = "daemon_loop_tests.rs"]
mod tests;
