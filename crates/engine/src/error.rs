// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArbiterError {
    #[error("timed out waiting for resource contention to clear")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("resource contention: {0}")]
    Arbiter(#[from] ArbiterError),

    #[error(transparent)]
    Adapter(#[from] fbuild_adapters::AdapterError),

    #[error("operation canceled")]
    Canceled,
}
