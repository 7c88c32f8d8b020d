// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fbuild deploy` — build and flash one environment through `fbuildd`.

use crate::client::{Client, WaitOutcome};
use crate::exit_error::ExitError;
use crate::output;
use clap::Args;
use fbuild_core::{DeployRequest, StateLayout};
use fbuild_daemon::InboundRequest;
use std::path::PathBuf;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Args)]
pub struct DeployArgs {
    /// Environment name from the project's fbuild.toml
    pub environment: String,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Serial port to flash, overriding the environment's configured port
    #[arg(long)]
    pub port: Option<String>,

    /// Remove the environment's build output before flashing
    #[arg(long)]
    pub clean_build: bool,

    /// Open a monitor session immediately after a successful flash
    #[arg(long)]
    pub monitor_after: bool,

    /// Seconds to wait for a halt pattern during the post-flash monitor
    #[arg(long)]
    pub monitor_timeout: Option<f64>,

    /// Regex: a matching line during the post-flash monitor fails the deploy
    #[arg(long)]
    pub monitor_halt_on_error: Option<String>,

    /// Regex: a matching line during the post-flash monitor completes the deploy
    #[arg(long)]
    pub monitor_halt_on_success: Option<String>,
}

pub async fn deploy(args: DeployArgs) -> Result<(), ExitError> {
    let project_dir = resolve_project_dir(args.project_dir)?;
    let layout = StateLayout::from_env().map_err(|e| ExitError::new(1, e.to_string()))?;
    let client = Client::new(layout);

    client
        .ensure_daemon_running(&super::find_fbuildd_binary())
        .await
        .map_err(|e| ExitError::new(1, e.to_string()))?;

    let request_id = super::request_id("deploy");
    let request = InboundRequest::Deploy(DeployRequest {
        project_dir: project_dir.to_string_lossy().into_owned(),
        environment: args.environment,
        port: args.port,
        clean_build: args.clean_build,
        monitor_after: args.monitor_after,
        monitor_timeout: args.monitor_timeout,
        monitor_halt_on_error: args.monitor_halt_on_error,
        monitor_halt_on_success: args.monitor_halt_on_success,
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
            println!("Deploy left running in the background (request {request_id})");
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
