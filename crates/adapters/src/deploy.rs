// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::AdapterError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything the flasher needs to know to upload one artifact.
pub struct DeployContext {
    pub project_dir: PathBuf,
    pub environment: String,
    pub port: Option<String>,
    pub artifact_path: PathBuf,
}

/// Result of a completed flash attempt.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub exit_code: i32,
    pub pid: Option<u32>,
}

impl DeployOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Receives events from a running flash attempt. Separate from
/// [`DeployOutcome`] because `on_spawn` fires while the process is still
/// running — in time for a caller to register the pid with the process
/// registry before the tree can orphan.
pub trait DeployOutputSink: Send {
    fn on_spawn(&mut self, pid: u32);
    fn on_line(&mut self, line: String);
}

/// Abstracts the chip-specific flasher binary (the esptool-equivalent).
/// Locating that binary and building its board-specific arguments is out
/// of scope; this trait only needs "run it and tell me what happened".
#[async_trait]
pub trait DeployAdapter: Send + Sync {
    async fn flash(
        &self,
        ctx: &DeployContext,
        sink: &mut dyn DeployOutputSink,
    ) -> Result<DeployOutcome, AdapterError>;
}

/// Spawns a configured external binary and streams its output.
pub struct ProcessDeployAdapter {
    program: String,
    extra_args: Vec<String>,
}

impl ProcessDeployAdapter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    fn build_args(&self, ctx: &DeployContext) -> Vec<String> {
        let mut args = vec![
            "--environment".to_string(),
            ctx.environment.clone(),
            "--artifact".to_string(),
            ctx.artifact_path.display().to_string(),
        ];
        if let Some(port) = &ctx.port {
            args.push("--port".to_string());
            args.push(port.clone());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

#[async_trait]
impl DeployAdapter for ProcessDeployAdapter {
    async fn flash(
        &self,
        ctx: &DeployContext,
        sink: &mut dyn DeployOutputSink,
    ) -> Result<DeployOutcome, AdapterError> {
        let args = self.build_args(ctx);
        let mut proc = fbuild_shell::spawn_capturing(
            &self.program,
            &args,
            &ctx.project_dir,
            &HashMap::new(),
        )?;
        let pid = proc.pid();
        if let Some(pid) = pid {
            sink.on_spawn(pid);
        }
        while let Some(line) = proc.lines.recv().await {
            sink.on_line(line.text);
        }
        let exit_code = proc.wait().await?;
        Ok(DeployOutcome { exit_code, pid })
    }
}

/// One scripted call recorded by [`FakeDeployAdapter`].
#[derive(Debug, Clone)]
pub struct RecordedFlash {
    pub project_dir: PathBuf,
    pub environment: String,
    pub port: Option<String>,
}

/// Deterministic test double: records every call and replays a scripted
/// exit code and output, never spawning a real process.
#[derive(Clone)]
pub struct FakeDeployAdapter {
    calls: Arc<Mutex<Vec<RecordedFlash>>>,
    scripted_lines: Vec<String>,
    scripted_exit_code: i32,
    scripted_pid: Option<u32>,
}

impl FakeDeployAdapter {
    pub fn new(scripted_exit_code: i32, scripted_lines: Vec<String>) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            scripted_lines,
            scripted_exit_code,
            scripted_pid: None,
        }
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.scripted_pid = Some(pid);
        self
    }

    pub fn calls(&self) -> Vec<RecordedFlash> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DeployAdapter for FakeDeployAdapter {
    async fn flash(
        &self,
        ctx: &DeployContext,
        sink: &mut dyn DeployOutputSink,
    ) -> Result<DeployOutcome, AdapterError> {
        self.calls.lock().push(RecordedFlash {
            project_dir: ctx.project_dir.clone(),
            environment: ctx.environment.clone(),
            port: ctx.port.clone(),
        });
        if let Some(pid) = self.scripted_pid {
            sink.on_spawn(pid);
        }
        for line in &self.scripted_lines {
            sink.on_line(line.clone());
        }
        Ok(DeployOutcome {
            exit_code: self.scripted_exit_code,
            pid: self.scripted_pid,
        })
    }
}

#[cfg(test)]
#[path = "deploy_tests.rs"]
mod tests;
