// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! fbuildd daemon library
//!
//! This crate holds the coordination daemon's own machinery — the request
//! inbox, process registry, process tree supervisor, and the scheduling
//! loop that ties them together — plus the inbox and pid-file types a CLI
//! client needs to talk to a running daemon. The `fbuildd` binary
//! (`src/main.rs`) is a thin wrapper around [`DaemonLoop`].

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod daemon_loop;
pub mod error;
pub mod inbox;
pub mod pidfile;
pub mod plan;
pub mod registry;
pub mod supervisor;
mod sysutil;

pub use config::DaemonConfig;
pub use daemon_loop::DaemonLoop;
pub use error::{DaemonError, InboxError, LifecycleError, RegistryError, SupervisorError};
pub use inbox::{validate as validate_request, InboundRequest, RequestInbox};
pub use pidfile::{read_pid, PidFile};
pub use plan::{deploy_plan, monitor_plan, PlanError};
pub use registry::ProcessRegistry;
pub use supervisor::ProcessTreeSupervisor;
