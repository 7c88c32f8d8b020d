// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two pieces of the daemon that actually run an operation: the
//! [`ResourceArbiter`] that serializes access to ports and project
//! directories, and the [`OperationExecutor`] state machine that drives
//! one deploy or monitor request from pickup to a terminal status.

mod arbiter;
mod error;
mod executor;
mod ring;

pub use arbiter::{ResourceArbiter, ResourceGuard};
pub use error::{ArbiterError, ExecutorError};
pub use executor::{
    CancelSignal, DeployPlan, ExecutorState, MonitorPlan, NullSink, OperationExecutor,
    OperationOutcome, StatusSink,
};
pub use ring::OutputRing;
