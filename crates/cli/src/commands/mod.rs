// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations.

pub mod daemon;
pub mod deploy;
pub mod monitor;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Builds a request id matching the convention the daemon itself uses for
/// requests it default-fills (`"<kind>_<millis>"`), so ids stay consistent
/// whichever side happens to assign one.
pub(crate) fn request_id(prefix: &str) -> String {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    format!("{prefix}_{millis}")
}

pub(crate) fn now_secs() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

/// Locates the `fbuildd` binary to spawn, preferring a sibling of the
/// running client executable so a debug build talks to a debug daemon
/// rather than whatever happens to be on `PATH`.
pub(crate) fn find_fbuildd_binary() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("fbuildd");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("fbuildd")
}
