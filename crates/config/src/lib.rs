// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project build/deploy/monitor configuration.
//!
//! A project directory carries one `fbuild.toml` describing its build
//! environments (board, default port, default baud rate, ...). This crate
//! parses that file and resolves one named environment's effective
//! configuration, the way the daemon's executor needs it before it can
//! hand a deploy or monitor request to an adapter.

mod error;
mod project;

pub use error::ConfigError;
pub use project::{EnvironmentConfig, ProjectConfig};
