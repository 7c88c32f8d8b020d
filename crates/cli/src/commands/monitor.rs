// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fbuild monitor` — open a serial monitor session through `fbuildd`.

use crate::client::{Client, WaitOutcome};
use crate::exit_error::ExitError;
use crate::output;
use clap::Args;
use fbuild_core::{MonitorRequest, StateLayout};
use fbuild_daemon::InboundRequest;
use std::path::PathBuf;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Args)]
pub struct MonitorArgs {
    /// Environment name from the project's fbuild.toml
    pub environment: String,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Serial port to open, overriding the environment's configured port
    #[arg(long)]
    pub port: Option<String>,

    /// Baud rate, overriding the environment's configured speed
    #[arg(long)]
    pub baud_rate: Option<u32>,

    /// Regex: a matching line fails the session
    #[arg(long)]
    pub halt_on_error: Option<String>,

    /// Regex: a matching line completes the session
    #[arg(long)]
    pub halt_on_success: Option<String>,

    /// Seconds to wait for a halt pattern before giving up
    #[arg(long)]
    pub timeout: Option<f64>,
}

pub async fn monitor(args: MonitorArgs) -> Result<(), ExitError> {
    let project_dir = resolve_project_dir(args.project_dir)?;
    let layout = StateLayout::from_env().map_err(|e| ExitError::new(1, e.to_string()))?;
    let client = Client::new(layout);

    client
        .ensure_daemon_running(&super::find_fbuildd_binary())
        .await
        .map_err(|e| ExitError::new(1, e.to_string()))?;

    let request_id = super::request_id("monitor");
    let request = InboundRequest::Monitor(MonitorRequest {
        project_dir: project_dir.to_string_lossy().into_owned(),
        environment: args.environment,
        port: args.port,
        baud_rate: args.baud_rate,
        halt_on_error: args.halt_on_error,
        halt_on_success: args.halt_on_success,
        timeout: args.timeout,
        caller_pid: std::process::id(),
        caller_cwd: current_dir_lossy(),
        timestamp: super::now_secs(),
        request_id: request_id.clone(),
    });

    client.submit(&request).map_err(|e| ExitError::new(1, e.to_string()))?;

    match client.wait_for_request(&request_id, POLL_INTERVAL, output::print_status_line).await {
        WaitOutcome::Terminal(status) => {
            let code = output::print_terminal_status(&status);
            if code == 0 {
                Ok(())
            } else {
                Err(ExitError::new(code, status.message))
            }
        }
        WaitOutcome::Detached => {
            println!("Monitor left running in the background (request {request_id})");
            Ok(())
        }
        WaitOutcome::Canceled => Err(ExitError::new(130, "canceled")),
    }
}

fn resolve_project_dir(project_dir: Option<PathBuf>) -> Result<PathBuf, ExitError> {
    let dir = match project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| ExitError::new(1, e.to_string()))?,
    };
    dir.canonicalize()
        .map_err(|e| ExitError::new(1, format!("invalid project directory {}: {e}", dir.display())))
}

fn current_dir_lossy() -> String {
    std::env::current_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}
