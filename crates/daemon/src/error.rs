// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Failures starting, stopping or locating a running daemon.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another daemon instance already holds the pid file lock at {0}")]
    AlreadyRunning(std::path::PathBuf),

    #[error("pid file at {path} names pid {pid}, which is not running")]
    StalePidFile { path: std::path::PathBuf, pid: u32 },

    #[error("no daemon is running")]
    NotRunning,

    #[error("failed to acquire pid file lock: {0}")]
    Lock(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] fbuild_wire::WireError),
}

/// Failures reading or mutating the process registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Wire(#[from] fbuild_wire::WireError),

    #[error("no registry entry for client pid {0}")]
    NotFound(u32),
}

/// Failures tearing down a tracked process tree. Per the daemon loop's
/// fault-tolerance policy, most of these are logged and retried on the next
/// sweep rather than propagated as fatal.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("could not signal pid {pid}: {source}")]
    Signal { pid: u32, source: std::io::Error },
}

/// Failures parsing or classifying an inbox entry. These are all
/// client-caused per the error taxonomy: the request is rejected, not
/// retried.
#[derive(Debug, Error)]
pub enum InboxError {
    #[error("request is missing required field: {0}")]
    MissingField(&'static str),

    #[error("project_dir must be an absolute path: {0}")]
    RelativeProjectDir(String),

    #[error("caller pid {0} is not running")]
    DeadCaller(u32),

    #[error(transparent)]
    Wire(#[from] fbuild_wire::WireError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Top-level error for the daemon binary, unifying every component error
/// so `main` has one place to log and map to a process exit code.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error(transparent)]
    Inbox(#[from] InboxError),

    #[error(transparent)]
    Executor(#[from] fbuild_engine::ExecutorError),

    #[error(transparent)]
    Storage(#[from] fbuild_storage::StorageError),

    #[error(transparent)]
    Config(#[from] fbuild_config::ConfigError),

    #[error(transparent)]
    Plan(#[from] crate::plan::PlanError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
