// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renders `DaemonStatus` transitions and daemon lifecycle results to the
//! terminal. Deliberately plain-text only: the client polls a handful of
//! human-readable status lines, not a table of rows.

use fbuild_core::{DaemonState, DaemonStatus};

/// Prints one line per distinct status message as an operation progresses,
/// e.g. "deploying: flashing firmware.bin".
pub fn print_status_line(status: &DaemonStatus) {
    println!("{}: {}", crate::color::context(status.state.as_str()), status.message);
}

/// Prints the final line for a terminal status and returns the process
/// exit code the caller should use.
///
/// The terminal `DaemonState` is authoritative, not `exit_code`: a
/// monitor session's halt patterns never produce a process exit code at
/// all (there's no subprocess to exit), so deriving the caller's exit
/// status from `exit_code` alone would report a successful monitor as a
/// failure.
pub fn print_terminal_status(status: &DaemonStatus) -> i32 {
    print_status_line(status);
    if !status.output_lines.is_empty() {
        println!();
        for line in &status.output_lines {
            println!("{line}");
        }
    }
    match status.state {
        DaemonState::Completed => 0,
        _ => 1,
    }
}

/// Renders `daemon status` output.
pub fn print_daemon_status(status: &DaemonStatus) {
    match status.daemon_pid {
        None => println!("Daemon not running"),
        Some(pid) => {
            println!("Status: {}", crate::color::literal(status.state.as_str()));
            println!("Daemon pid: {pid}");
            if let Some(started_at) = status.daemon_started_at {
                println!("Uptime: {}", format_uptime_since(started_at));
            }
            if status.operation_in_progress {
                println!("Operation in progress: {}", status.message);
                if let Some(request_id) = &status.request_id {
                    println!("Request: {request_id}");
                }
            } else {
                println!("No operation in progress");
            }
        }
    }
}

fn format_uptime_since(started_at: f64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(started_at);
    let secs = (now - started_at).max(0.0) as u64;
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    if hours > 0 {
        format!("{hours}h {mins}m {secs}s")
    } else if mins > 0 {
        format!("{mins}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
