// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type shared by the few core-level fallible operations (mainly
//! JSON (de)serialization of the message types). Component-specific errors
//! (arbiter timeouts, supervisor failures, adapter failures, ...) live in
//! their owning crates and commonly wrap this one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}
