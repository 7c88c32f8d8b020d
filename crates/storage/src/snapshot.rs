// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic atomic-snapshot persistence with rotating backups.

use crate::error::StorageError;
use fbuild_wire::{read_json_lenient, write_json_atomic};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

const MAX_BAK_FILES: u32 = 3;

/// Picks the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`. The
/// oldest backup is dropped when the limit is reached, and each existing
/// backup shifts up by one before the newest snapshot takes `.bak`.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

/// A single JSON value persisted at `path`, written via temp-file +
/// atomic rename, with the previous contents preserved as a rotating
/// `.bak` before being overwritten.
pub struct SnapshotStore<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> SnapshotStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the current snapshot, returning `None` if the file is
    /// missing or fails to parse (corruption never propagates as an
    /// error here — callers decide what a missing snapshot means).
    pub fn load(&self) -> Option<T> {
        read_json_lenient(&self.path)
    }

    /// Backs up the current file (if any) and atomically writes `value`.
    pub fn save(&self, value: &T) -> Result<(), StorageError> {
        if self.path.exists() {
            let bak = rotate_bak_path(&self.path);
            let _ = fs::copy(&self.path, bak);
        }
        write_json_atomic(&self.path, value)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
