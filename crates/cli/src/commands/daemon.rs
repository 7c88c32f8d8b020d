// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fbuild daemon` — inspect or stop the running `fbuildd`.

use crate::client::{Client, StopOutcome};
use crate::exit_error::ExitError;
use crate::output;
use clap::{Args, Subcommand};
use fbuild_core::StateLayout;

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Print the daemon's current status
    Status,
    /// Ask the daemon to shut down
    Stop,
}

pub async fn daemon(args: DaemonArgs) -> Result<(), ExitError> {
    let layout = StateLayout::from_env().map_err(|e| ExitError::new(1, e.to_string()))?;
    let client = Client::new(layout);

    match args.command {
        DaemonCommand::Status => {
            output::print_daemon_status(&client.daemon_status());
            Ok(())
        }
        DaemonCommand::Stop => {
            match client.stop_daemon().await.map_err(|e| ExitError::new(1, e.to_string()))? {
                StopOutcome::NotRunning => {
                    println!("Daemon not running");
                    Ok(())
                }
                StopOutcome::Stopped => {
                    println!("Daemon stopped");
                    Ok(())
                }
                StopOutcome::TimedOut => {
                    Err(ExitError::new(1, "daemon did not stop within the grace period"))
                }
            }
        }
    }
}
