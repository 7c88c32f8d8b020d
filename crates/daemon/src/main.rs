// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for the `fbuildd` coordination daemon. Behavior is entirely
//! env-driven (see [`fbuild_daemon::DaemonConfig`]) — there is no CLI
//! surface on this binary, only on the client.

use fbuild_adapters::{ProcessDeployAdapter, SerialMonitorAdapter};
use fbuild_core::StateLayout;
use fbuild_daemon::{DaemonConfig, DaemonLoop, PidFile};
use std::io::Write;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Prefix of the line `fbuildd` appends to its log before doing anything
/// else, so a client that just spawned the daemon can find where this
/// attempt's output starts and scan forward for an `ERROR` line.
const STARTUP_MARKER_PREFIX: &str = "--- fbuildd: starting (pid: ";

fn write_startup_marker(layout: &StateLayout) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(layout.log_file())?;
    writeln!(file, "{STARTUP_MARKER_PREFIX}{}) ---\n", std::process::id())
}

fn write_startup_error(layout: &StateLayout, error: &impl std::fmt::Display) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(layout.log_file())
    else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start fbuildd: {error}");
}

fn init_tracing(layout: &StateLayout) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(layout.root(), "daemon.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_env("FBUILD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();
    guard
}

/// Forwards SIGTERM/SIGINT into the same `shutdown.signal` file a client's
/// `stop_daemon` touches, so the daemon loop has exactly one shutdown path
/// regardless of who asked for it.
fn spawn_signal_forwarder(layout: StateLayout) {
    tokio::spawn(async move {
        let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
            return;
        };
        let Ok(mut sigint) = signal(SignalKind::interrupt()) else {
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("received SIGTERM"),
            _ = sigint.recv() => tracing::info!("received SIGINT"),
        }
        let _ = fbuild_wire::touch(&layout.shutdown_signal_file());
    });
}

#[tokio::main]
async fn main() {
    let config = match DaemonConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("fbuildd: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = config.layout.ensure_dirs() {
        eprintln!("fbuildd: failed to create state directory: {err}");
        std::process::exit(1);
    }

    let _ = write_startup_marker(&config.layout);

    // Keep the guard alive for the process lifetime; dropping it would
    // stop flushing buffered log lines to disk.
    let _tracing_guard = init_tracing(&config.layout);

    let pid_file = match PidFile::acquire(config.layout.pid_file()) {
        Ok(pid_file) => pid_file,
        Err(err) => {
            write_startup_error(&config.layout, &err);
            tracing::error!("{err}");
            eprintln!("fbuildd: {err}");
            std::process::exit(1);
        }
    };

    tracing::info!(pid = std::process::id(), "fbuildd starting");

    let flasher_bin = std::env::var("FBUILD_FLASHER_BIN").unwrap_or_else(|_| "esptool".to_string());
    let deploy_adapter = ProcessDeployAdapter::new(flasher_bin);
    let monitor_adapter = SerialMonitorAdapter;

    spawn_signal_forwarder(config.layout.clone());

    let daemon_loop = Arc::new(DaemonLoop::new(config, deploy_adapter, monitor_adapter));
    if let Err(err) = daemon_loop.run().await {
        tracing::error!("daemon loop exited with error: {err}");
    }

    drop(pid_file);
    tracing::info!("fbuildd stopped");
}
