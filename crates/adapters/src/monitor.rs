// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::AdapterError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::time::Duration;

/// One open serial connection. `read_line` returns `Ok(None)` when the
/// bounded read window elapsed with no complete line available — that is
/// not an error, it is how the caller polls for a timeout.
#[async_trait]
pub trait SerialSession: Send {
    async fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, AdapterError>;
}

/// Abstracts the serial port itself. Auto-detecting a port, resolving the
/// configured baud rate, and the concrete transport are out of scope;
/// this trait only needs "open it, reset the device, hand me lines".
#[async_trait]
pub trait MonitorAdapter: Send + Sync {
    async fn open(&self, port: &str, baud: u32) -> Result<Box<dyn SerialSession>, AdapterError>;
}

/// Opens a real serial port via `serialport`, performs the DTR/RTS reset
/// pulse so output is captured from device boot even if the flasher just
/// released the port, and reads lines with a short per-read timeout.
pub struct SerialMonitorAdapter;

struct RealSerialSession {
    port: Box<dyn serialport::SerialPort>,
    pending: Vec<u8>,
}

#[async_trait]
impl MonitorAdapter for SerialMonitorAdapter {
    async fn open(&self, port: &str, baud: u32) -> Result<Box<dyn SerialSession>, AdapterError> {
        let port = port.to_string();
        tokio::task::spawn_blocking(move || {
            let mut handle = serialport::new(&port, baud)
                .timeout(Duration::from_millis(100))
                .open()
                .map_err(|source| AdapterError::OpenPort {
                    port: port.clone(),
                    source: std::io::Error::new(ErrorKind::Other, source),
                })?;

            // Reset pulse: catches output from the very start of boot even
            // if the device already started between flash and monitor.
            let _ = handle.write_data_terminal_ready(false);
            let _ = handle.write_request_to_send(true);
            std::thread::sleep(Duration::from_millis(100));
            let _ = handle.write_request_to_send(false);
            std::thread::sleep(Duration::from_millis(100));
            let _ = handle.write_data_terminal_ready(true);
            std::thread::sleep(Duration::from_millis(200));

            Ok(Box::new(RealSerialSession {
                port: handle,
                pending: Vec::new(),
            }) as Box<dyn SerialSession>)
        })
        .await
        .map_err(|_| AdapterError::Read(std::io::Error::new(ErrorKind::Other, "join error")))?
    }
}

#[async_trait]
impl SerialSession for RealSerialSession {
    async fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, AdapterError> {
        // Each underlying read already has its own short timeout; loop
        // reads until `timeout` elapses or a full line is assembled.
        let deadline = std::time::Instant::now() + timeout;
        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let line_bytes: Vec<u8> = self.pending.drain(..=pos).collect();
                let text = String::from_utf8_lossy(&line_bytes)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                return Ok(Some(text));
            }
            if std::time::Instant::now() >= deadline {
                return Ok(None);
            }
            let mut buf = [0u8; 256];
            match self.port.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::TimedOut => continue,
                Err(e) => return Err(AdapterError::Read(e)),
            }
        }
    }
}

/// One scripted output line, with the delay to wait before emitting it.
#[derive(Debug, Clone)]
pub struct ScriptedLine {
    pub text: String,
    pub after: Duration,
}

impl ScriptedLine {
    pub fn new(text: impl Into<String>, after: Duration) -> Self {
        Self {
            text: text.into(),
            after,
        }
    }
}

/// Deterministic test double: replays a scripted sequence of lines with
/// scripted delays, never touching real hardware.
pub struct FakeMonitorAdapter {
    script: Arc<Mutex<VecDeque<ScriptedLine>>>,
}

impl FakeMonitorAdapter {
    pub fn new(lines: Vec<ScriptedLine>) -> Self {
        Self {
            script: Arc::new(Mutex::new(lines.into_iter().collect())),
        }
    }
}

#[async_trait]
impl MonitorAdapter for FakeMonitorAdapter {
    async fn open(&self, _port: &str, _baud: u32) -> Result<Box<dyn SerialSession>, AdapterError> {
        Ok(Box::new(FakeSerialSession {
            script: self.script.clone(),
        }))
    }
}

struct FakeSerialSession {
    script: Arc<Mutex<VecDeque<ScriptedLine>>>,
}

#[async_trait]
impl SerialSession for FakeSerialSession {
    async fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, AdapterError> {
        let next = self.script.lock().pop_front();
        match next {
            Some(scripted) if scripted.after <= timeout => {
                tokio::time::sleep(scripted.after).await;
                Ok(Some(scripted.text))
            }
            Some(scripted) => {
                // Not ready within this read's window: put it back.
                tokio::time::sleep(timeout).await;
                self.script.lock().push_front(scripted);
                Ok(None)
            }
            None => {
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
