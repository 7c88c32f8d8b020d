// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon runtime configuration, resolved from environment variables with
//! production-sane defaults. Every knob here is a tuning parameter, not a
//! feature switch, so there's no config file to parse.

use fbuild_core::{StateLayout, DEFAULT_STALE_SECONDS};
use std::time::Duration;

fn env_duration_ms(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Tuning knobs for the daemon loop, independent of any one request.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub layout: StateLayout,
    /// How often the daemon loop scans the inbox and refreshes the registry.
    pub tick_interval: Duration,
    /// Maximum number of requests the worker pool runs concurrently.
    pub max_concurrent_operations: usize,
    /// A status older than this looks like `unknown` to readers.
    pub stale_seconds: f64,
    /// How long the process tree supervisor waits after SIGTERM before
    /// escalating to SIGKILL.
    pub kill_grace: Duration,
    /// How long a request waits for its port/project-dir pair to free up
    /// before the daemon gives up and fails it as resource contention.
    pub arbiter_timeout: Duration,
    /// How many ticks pass between registry refresh + orphan sweeps.
    pub maintenance_every_ticks: u64,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self, fbuild_core::LayoutError> {
        Ok(Self {
            layout: StateLayout::from_env()?,
            tick_interval: env_duration_ms("FBUILD_DAEMON_TICK_MS", Duration::from_millis(200)),
            max_concurrent_operations: env_usize("FBUILD_DAEMON_MAX_CONCURRENT", 4),
            stale_seconds: env_f64("FBUILD_DAEMON_STALE_SECONDS", DEFAULT_STALE_SECONDS),
            kill_grace: env_duration_ms("FBUILD_DAEMON_KILL_GRACE_MS", Duration::from_secs(3)),
            arbiter_timeout: env_duration_ms(
                "FBUILD_DAEMON_ARBITER_TIMEOUT_MS",
                Duration::from_secs(30),
            ),
            maintenance_every_ticks: env_usize("FBUILD_DAEMON_MAINTENANCE_EVERY_TICKS", 10) as u64,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
