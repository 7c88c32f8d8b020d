// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fbuild` — the client side of the build/deploy/monitor coordination
//! daemon. Every subcommand talks to `fbuildd` purely through its state
//! directory; this binary never touches a serial port or flasher itself.

mod client;
mod color;
mod commands;
mod error;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "fbuild", version, about = "Client for the fbuildd embedded build/deploy/monitor daemon")]
#[command(styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build and flash a project environment
    Deploy(commands::deploy::DeployArgs),
    /// Open a serial monitor session
    Monitor(commands::monitor::MonitorArgs),
    /// Inspect or stop the fbuildd daemon
    Daemon(commands::daemon::DaemonArgs),
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    match cli.command {
        Command::Deploy(args) => commands::deploy::deploy(args).await,
        Command::Monitor(args) => commands::monitor::monitor(args).await,
        Command::Daemon(args) => commands::daemon::daemon(args).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("fbuild: {err}");
        std::process::exit(err.code);
    }
}
