// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin trait boundaries around the two external tools the executor
//! drives: a chip-specific flasher binary and a serial port. Locating the
//! flasher binary, parsing board definitions, and the serial-port
//! implementation itself are out of scope here — see [`DeployAdapter`]
//! and [`MonitorAdapter`].

mod deploy;
mod error;
mod monitor;

pub use deploy::{DeployAdapter, DeployContext, DeployOutcome, DeployOutputSink, ProcessDeployAdapter};
pub use error::AdapterError;
pub use monitor::{MonitorAdapter, SerialMonitorAdapter, SerialSession};

#[cfg(any(test, feature = "test-support"))]
pub use deploy::FakeDeployAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use monitor::{FakeMonitorAdapter, ScriptedLine};
