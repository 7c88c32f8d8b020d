// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::SpawnError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Reads `reader` line-by-line, decoding each line as UTF-8 with invalid
/// bytes replaced rather than failing the read (mirrors
/// `bytes.decode("utf-8", errors="replace")` on the serial/process output
/// this is modeled on).
async fn pump_lines<R: AsyncRead + Unpin>(
    reader: R,
    stream: OutputStream,
    tx: mpsc::UnboundedSender<OutputLine>,
) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                while buf.last() == Some(&b'\n') || buf.last() == Some(&b'\r') {
                    buf.pop();
                }
                let text = String::from_utf8_lossy(&buf).into_owned();
                if tx.send(OutputLine { stream, text }).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    }
}

/// Which stream an [`OutputLine`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

/// A spawned child process whose stdout/stderr are streamed to a channel
/// as UTF-8 lines (invalid bytes replaced, matching how the monitor reads
/// serial output).
pub struct CapturedProcess {
    child: Child,
    pub lines: mpsc::UnboundedReceiver<OutputLine>,
}

impl CapturedProcess {
    /// OS process id of the spawned root process. The process registry
    /// tracks its descendants from this PID.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Waits for the process to exit, returning its exit code (or -1 if
    /// it was terminated by a signal, which has no portable exit code).
    pub async fn wait(&mut self) -> Result<i32, SpawnError> {
        let status = self.child.wait().await.map_err(SpawnError::Wait)?;
        Ok(status.code().unwrap_or(-1))
    }

    /// Best-effort immediate kill of just this process (not its
    /// descendants — that's the supervisor's job).
    pub async fn kill(&mut self) {
        let _ = self.child.kill().await;
    }
}

/// Spawns `program` with `args` in `cwd`, merging `env` into the current
/// process environment, and begins streaming its stdout/stderr.
pub fn spawn_capturing(
    program: &str,
    args: &[String],
    cwd: &PathBuf,
    env: &HashMap<String, String>,
) -> Result<CapturedProcess, SpawnError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| SpawnError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (tx, rx) = mpsc::unbounded_channel();

    if let Some(stdout) = stdout {
        let tx = tx.clone();
        tokio::spawn(pump_lines(stdout, OutputStream::Stdout, tx));
    }

    if let Some(stderr) = stderr {
        tokio::spawn(pump_lines(stderr, OutputStream::Stderr, tx));
    }

    Ok(CapturedProcess { child, lines: rx })
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
