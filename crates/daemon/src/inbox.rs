// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An append-only directory of request files: each client writes its own
//! `request_<id>.json`, so two clients submitting at once never race a
//! shared filename. The daemon claims a file by renaming it out of
//! scanning range before it does anything else with it.

use crate::error::InboxError;
use crate::sysutil;
use fbuild_core::{DeployRequest, MonitorRequest, OperationKind, StateLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Either shape of request a client can submit, discriminated by an
/// internally-tagged `kind` field so the daemon doesn't have to guess from
/// which optional fields happen to be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundRequest {
    Deploy(DeployRequest),
    Monitor(MonitorRequest),
}

impl InboundRequest {
    pub fn request_id(&self) -> &str {
        match self {
            Self::Deploy(r) => &r.request_id,
            Self::Monitor(r) => &r.request_id,
        }
    }

    pub fn project_dir(&self) -> &str {
        match self {
            Self::Deploy(r) => &r.project_dir,
            Self::Monitor(r) => &r.project_dir,
        }
    }

    pub fn caller_pid(&self) -> u32 {
        match self {
            Self::Deploy(r) => r.caller_pid,
            Self::Monitor(r) => r.caller_pid,
        }
    }

    pub fn caller_cwd(&self) -> &str {
        match self {
            Self::Deploy(r) => &r.caller_cwd,
            Self::Monitor(r) => &r.caller_cwd,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Deploy(_) => OperationKind::Deploy,
            Self::Monitor(_) => OperationKind::Monitor,
        }
    }
}

/// Checks the fields the daemon is responsible for validating at pickup
/// time: required fields present, `project_dir` absolute, caller still
/// alive. Anything else (unknown environment, missing board) surfaces
/// later as an ordinary execution failure, not a rejection.
pub fn validate(request: &InboundRequest, system: &sysinfo::System) -> Result<(), InboxError> {
    if request.request_id().is_empty() {
        return Err(InboxError::MissingField("request_id"));
    }
    if request.project_dir().is_empty() {
        return Err(InboxError::MissingField("project_dir"));
    }
    if !Path::new(request.project_dir()).is_absolute() {
        return Err(InboxError::RelativeProjectDir(request.project_dir().to_string()));
    }
    if !sysutil::is_alive(system, request.caller_pid()) {
        return Err(InboxError::DeadCaller(request.caller_pid()));
    }
    Ok(())
}

pub struct RequestInbox {
    layout: StateLayout,
}

impl RequestInbox {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    /// Client-side: writes a new request file via temp-file + rename and
    /// returns immediately.
    pub fn submit(&self, request: &InboundRequest) -> Result<(), InboxError> {
        let path = self.layout.inbox_request_file(request.request_id());
        fbuild_wire::write_json_atomic(&path, request)?;
        Ok(())
    }

    /// Lists pending (unclaimed) request files. Request ids embed a
    /// millisecond timestamp, so lexical filename order tracks arrival
    /// order closely enough for FIFO-ish fairness.
    pub fn scan_pending(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = std::fs::read_dir(self.layout.inbox_dir()) else {
            return Vec::new();
        };
        let mut files: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_pending_name(path))
            .collect();
        files.sort();
        files
    }

    /// Renames a pending file into an in-progress slot named by its
    /// request id, so a second scan in the same tick (or a scan that races
    /// a slow claim) can't pick the same file up twice.
    pub fn claim(&self, path: &Path) -> Result<PathBuf, InboxError> {
        let file_name = path
            .file_name()
            .ok_or(InboxError::MissingField("file_name"))?
            .to_string_lossy()
            .into_owned();
        let claimed = self.layout.inbox_dir().join(format!(".inflight_{file_name}"));
        std::fs::rename(path, &claimed)?;
        Ok(claimed)
    }

    pub fn load(&self, path: &Path) -> Result<InboundRequest, InboxError> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Moves a claimed (or raw pending) file to the rejected directory,
    /// stripping the in-flight marker if present.
    pub fn reject(&self, path: &Path) -> Result<(), InboxError> {
        let file_name = path
            .file_name()
            .ok_or(InboxError::MissingField("file_name"))?
            .to_string_lossy();
        let canonical = file_name.strip_prefix(".inflight_").unwrap_or(&file_name);
        let rejected_dir = self.layout.rejected_dir();
        std::fs::create_dir_all(&rejected_dir)?;
        std::fs::rename(path, rejected_dir.join(canonical))?;
        Ok(())
    }

    /// Removes a claimed file once its operation has run to completion
    /// (successfully or not) — a terminal status has already been
    /// published, so the inbox entry itself is no longer needed.
    pub fn complete(&self, path: &Path) -> Result<(), InboxError> {
        std::fs::remove_file(path)?;
        Ok(())
    }
}

fn is_pending_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| name.starts_with("request_") && name.ends_with(".json"))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "inbox_tests.rs"]
mod tests;
