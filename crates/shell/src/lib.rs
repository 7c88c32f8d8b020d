// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawning external tools (compiler drivers, flashers) and capturing
//! their output line-by-line as it arrives, so an executor can stream it
//! into a status snapshot instead of waiting for the process to exit.

mod error;
mod spawn;

pub use error::SpawnError;
pub use spawn::{spawn_capturing, CapturedProcess, OutputLine, OutputStream};
