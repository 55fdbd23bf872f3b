//! Snapshot file reader/writer
//!
//! The interchange format is the exporter's JSON document:
//! `{contentTypes, entries, assets, locales}` plus optional
//! `editorInterfaces`. Reading validates the snapshot; writing is atomic
//! and pretty-printed. A read-write cycle preserves every field value.

use std::fs;
use std::path::Path;

use envsync_core::model::Snapshot;
use envsync_core::validate_snapshot;

use crate::atomic::atomic_write;
use crate::errors::{io_error, snapshot_format, snapshot_invalid, Result};

/// Read and validate a snapshot file
///
/// # Errors
///
/// - `Io` when the file cannot be read
/// - `Serialization` when it is not a snapshot document
/// - `InvalidSnapshot` when the default-locale or id-uniqueness rules fail
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path).map_err(|e| io_error("read_snapshot", e))?;
    let snapshot = parse_snapshot_str(&content)?;

    tracing::debug!(
        path = %path.display(),
        entry_count = snapshot.entries.len() as u64,
        asset_count = snapshot.assets.len() as u64,
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Parse and validate a snapshot from a string
///
/// # Errors
///
/// See [`read_snapshot`].
pub fn parse_snapshot_str(content: &str) -> Result<Snapshot> {
    let snapshot: Snapshot = serde_json::from_str(content)
        .map_err(|e| snapshot_format(&format!("Snapshot JSON parse error: {}", e)))?;

    validate_snapshot(&snapshot).map_err(snapshot_invalid)?;

    Ok(snapshot)
}

/// Write a snapshot as pretty JSON, atomically
///
/// # Errors
///
/// - `Serialization` if encoding fails
/// - `Io` if the file cannot be written
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| snapshot_format(&format!("Snapshot JSON encode error: {}", e)))?;
    bytes.push(b'\n');
    atomic_write(path, &bytes)
}
