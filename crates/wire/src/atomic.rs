// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::WireError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Serializes `value` to `path` via a sibling temp file and an atomic
/// rename, so concurrent readers only ever see the prior complete
/// contents or the new complete contents, never a partial write.
///
/// The temp file name is unique per call (process id + nanosecond
/// timestamp) so concurrent writers targeting different final paths in
/// the same directory never collide.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), WireError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let tmp_name = format!(
        ".{}.tmp.{}.{}",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("fbuild"),
        std::process::id(),
        nanos
    );
    let tmp_path = dir.join(tmp_name);

    let json = serde_json::to_vec_pretty(value)?;
    std::fs::write(&tmp_path, &json)?;
    std::fs::rename(&tmp_path, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        WireError::Io(source)
    })?;
    Ok(())
}

/// Reads and parses a JSON file, tolerating absence or corruption by
/// returning `Ok(None)` rather than an error — callers treat a missing or
/// unparseable file the same way (fall back to a synthetic default),
/// mirroring how the original implementation degrades a bad status file
/// to "unknown" instead of crashing.
pub fn read_json_lenient<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = std::fs::read(path).ok()?;
    serde_json::from_slice(&content).ok()
}

/// Creates an empty marker file (signal files: presence is the signal).
pub fn touch(path: &Path) -> Result<(), WireError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, b"")?;
    Ok(())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
