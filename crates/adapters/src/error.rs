// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to spawn flasher: {0}")]
    Spawn(#[from] fbuild_shell::SpawnError),

    #[error("failed to open serial port {port}: {source}")]
    OpenPort {
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no serial port available (auto-detect found nothing)")]
    NoPortAvailable,

    #[error("read from serial port failed: {0}")]
    Read(#[source] std::io::Error),
}
