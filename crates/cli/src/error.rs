// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the client side of the daemon protocol.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to spawn fbuildd: {0}")]
    Spawn(std::io::Error),

    #[error("fbuildd failed to start: {0}")]
    StartupFailed(String),

    #[error("timed out waiting for fbuildd to start")]
    StartupTimeout,

    #[error(transparent)]
    Inbox(#[from] fbuild_daemon::InboxError),

    #[error(transparent)]
    Wire(#[from] fbuild_wire::WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
