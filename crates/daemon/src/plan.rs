// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates an inbox request plus the project's `fbuild.toml` environment
//! into the plain parameter structs [`fbuild_engine::DeployPlan`] and
//! [`fbuild_engine::MonitorPlan`] the executor actually runs.
//!
//! Building the firmware artifact itself is out of scope (see the
//! compiler/linker non-goal) — `clean_build` only clears the conventional
//! output directory, and the artifact is otherwise expected to already be
//! there by the time a deploy request reaches the daemon.

use fbuild_config::{ConfigError, ProjectConfig};
use fbuild_core::{DeployRequest, MonitorRequest};
use fbuild_engine::{DeployPlan, MonitorPlan};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MONITOR_BAUD: u32 = 115_200;
pub const DEFAULT_MONITOR_TIMEOUT_SECS: f64 = 30.0;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no build artifact at {0}; build the project before deploying")]
    ArtifactMissing(PathBuf),

    #[error("no port configured for environment {0:?} and none given in the request")]
    MissingPort(String),
}

/// Conventional location of an environment's build output.
pub fn artifact_path(project_dir: &Path, environment: &str) -> PathBuf {
    project_dir.join(".fbuild-build").join(environment).join("firmware.bin")
}

/// Removes the conventional build output directory for `environment`, as
/// if a fresh build were about to happen. A missing directory is not an
/// error — there's nothing to clean.
pub fn clean_build(project_dir: &Path, environment: &str) -> std::io::Result<()> {
    let dir = project_dir.join(".fbuild-build").join(environment);
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }
    Ok(())
}

pub fn deploy_plan(request: &DeployRequest, config: &ProjectConfig) -> Result<DeployPlan, PlanError> {
    let env = config.environment(&request.environment)?;
    let project_dir = PathBuf::from(&request.project_dir);

    if request.clean_build {
        let _ = clean_build(&project_dir, &request.environment);
    }

    let artifact_path = artifact_path(&project_dir, &request.environment);
    if !artifact_path.exists() {
        return Err(PlanError::ArtifactMissing(artifact_path));
    }

    let port = request.port.clone().or_else(|| env.port.clone());

    Ok(DeployPlan {
        project_dir,
        environment: request.environment.clone(),
        port,
        artifact_path,
        monitor_after: request.monitor_after,
        halt_on_error: request.monitor_halt_on_error.clone(),
        halt_on_success: request.monitor_halt_on_success.clone(),
        monitor_timeout: Duration::from_secs_f64(
            request.monitor_timeout.unwrap_or(DEFAULT_MONITOR_TIMEOUT_SECS),
        ),
        baud_rate: env.monitor_speed.unwrap_or(DEFAULT_MONITOR_BAUD),
    })
}

pub fn monitor_plan(request: &MonitorRequest, config: &ProjectConfig) -> Result<MonitorPlan, PlanError> {
    let env = config.environment(&request.environment)?;
    let port = request
        .port
        .clone()
        .or_else(|| env.port.clone())
        .ok_or_else(|| PlanError::MissingPort(request.environment.clone()))?;

    Ok(MonitorPlan {
        port,
        baud_rate: request.baud_rate.or(env.monitor_speed).unwrap_or(DEFAULT_MONITOR_BAUD),
        halt_on_error: request.halt_on_error.clone(),
        halt_on_success: request.halt_on_success.clone(),
        timeout: Duration::from_secs_f64(request.timeout.unwrap_or(DEFAULT_MONITOR_TIMEOUT_SECS)),
    })
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
