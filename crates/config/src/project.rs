// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::ConfigError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One `[env.<name>]` table in `fbuild.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub board: String,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub monitor_speed: Option<u32>,
    #[serde(default)]
    pub upload_speed: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawProjectConfig {
    #[serde(default, rename = "env")]
    environments: IndexMap<String, EnvironmentConfig>,
}

/// A parsed `fbuild.toml`, preserving declaration order of environments.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    path: PathBuf,
    environments: IndexMap<String, EnvironmentConfig>,
}

impl ProjectConfig {
    /// Loads `<project_dir>/fbuild.toml`.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = project_dir.join("fbuild.toml");
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let raw: RawProjectConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            environments: raw.environments,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves one named environment's effective config.
    pub fn environment(&self, name: &str) -> Result<&EnvironmentConfig, ConfigError> {
        self.environments
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEnvironment(name.to_string()))
    }

    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
