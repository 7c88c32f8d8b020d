// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fbuild-core: shared types for the fbuild coordination daemon and its clients.

pub mod macros;

pub mod error;
pub mod layout;
pub mod messages;
pub mod process_tree;

pub use error::CoreError;
pub use layout::{LayoutError, StateLayout, STATE_DIR_ENV};
pub use messages::{
    DaemonState, DaemonStatus, DeployRequest, MonitorRequest, OperationKind,
    DEFAULT_STALE_SECONDS,
};
pub use process_tree::ProcessTreeInfo;
