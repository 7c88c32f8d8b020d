// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed client/daemon message and status types.
//!
//! These are the values written to and read from the request inbox and the
//! status store (see `fbuild-storage`); every field name and default here
//! tracks the on-disk JSON shape so an older status file left behind by a
//! previous daemon version still deserializes.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Daemon state as published in [`DaemonStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaemonState {
    Idle,
    Deploying,
    Monitoring,
    Building,
    Completed,
    Failed,
    /// No daemon running, or its status file is missing/stale/corrupt.
    Unknown,
}

impl DaemonState {
    /// Parses a state string, defaulting to [`DaemonState::Unknown`] on any
    /// value this build doesn't recognize (forward-compatible with a newer
    /// daemon's status file).
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "idle" => Self::Idle,
            "deploying" => Self::Deploying,
            "monitoring" => Self::Monitoring,
            "building" => Self::Building,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Deploying => "deploying",
            Self::Monitoring => "monitoring",
            Self::Building => "building",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

crate::simple_display! {
    DaemonState {
        Idle => "idle",
        Deploying => "deploying",
        Monitoring => "monitoring",
        Building => "building",
        Completed => "completed",
        Failed => "failed",
        Unknown => "unknown",
    }
}

/// The kind of operation a request asks the daemon to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Deploy,
    Monitor,
    BuildAndDeploy,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Monitor => "monitor",
            Self::BuildAndDeploy => "build_and_deploy",
        }
    }
}

crate::simple_display! {
    OperationKind {
        Deploy => "deploy",
        Monitor => "monitor",
        BuildAndDeploy => "build_and_deploy",
    }
}

/// Client → daemon: a request to build and flash a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    pub project_dir: String,
    pub environment: String,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub clean_build: bool,
    #[serde(default)]
    pub monitor_after: bool,
    #[serde(default)]
    pub monitor_timeout: Option<f64>,
    #[serde(default)]
    pub monitor_halt_on_error: Option<String>,
    #[serde(default)]
    pub monitor_halt_on_success: Option<String>,
    pub caller_pid: u32,
    pub caller_cwd: String,
    #[serde(default = "now_secs")]
    pub timestamp: f64,
    #[serde(default = "DeployRequest::default_request_id")]
    pub request_id: String,
}

impl DeployRequest {
    fn default_request_id() -> String {
        format!("deploy_{}", now_millis())
    }
}

/// Client → daemon: a request to open a serial monitor session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorRequest {
    pub project_dir: String,
    pub environment: String,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub baud_rate: Option<u32>,
    #[serde(default)]
    pub halt_on_error: Option<String>,
    #[serde(default)]
    pub halt_on_success: Option<String>,
    #[serde(default)]
    pub timeout: Option<f64>,
    pub caller_pid: u32,
    pub caller_cwd: String,
    #[serde(default = "now_secs")]
    pub timestamp: f64,
    #[serde(default = "MonitorRequest::default_request_id")]
    pub request_id: String,
}

impl MonitorRequest {
    fn default_request_id() -> String {
        format!("monitor_{}", now_millis())
    }
}

/// Daemon → client: a status snapshot, written atomically and read freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    pub state: DaemonState,
    pub message: String,
    pub updated_at: f64,
    #[serde(default)]
    pub operation_in_progress: bool,
    #[serde(default)]
    pub daemon_pid: Option<u32>,
    #[serde(default)]
    pub daemon_started_at: Option<f64>,
    #[serde(default)]
    pub caller_pid: Option<u32>,
    #[serde(default)]
    pub caller_cwd: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub request_started_at: Option<f64>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub project_dir: Option<String>,
    #[serde(default)]
    pub current_operation: Option<String>,
    #[serde(default)]
    pub operation_type: Option<OperationKind>,
    #[serde(default)]
    pub output_lines: Vec<String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub port: Option<String>,
}

/// Default staleness threshold: a status older than this is reported to
/// callers as [`DaemonState::Unknown`] rather than its on-disk value.
pub const DEFAULT_STALE_SECONDS: f64 = 30.0;

impl DaemonStatus {
    pub fn idle(daemon_pid: u32, daemon_started_at: f64) -> Self {
        Self {
            state: DaemonState::Idle,
            message: "daemon idle".to_string(),
            updated_at: now_secs(),
            operation_in_progress: false,
            daemon_pid: Some(daemon_pid),
            daemon_started_at: Some(daemon_started_at),
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

    pub fn is_stale(&self, threshold_seconds: f64) -> bool {
        (now_secs() - self.updated_at) > threshold_seconds
    }

    pub fn age_seconds(&self) -> f64 {
        now_secs() - self.updated_at
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
