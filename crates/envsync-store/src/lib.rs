//! envsync store - snapshot files and run configuration
//!
//! Provides:
//! - Snapshot JSON reader/writer with validation and atomic writes
//! - Run configuration (TOML) and management-token lookup

pub mod atomic;
pub mod config;
pub mod errors;
pub mod snapshot_file;

// Re-export key types
pub use config::{load_config, management_token, RunConfig};
pub use errors::Result;
pub use snapshot_file::{parse_snapshot_str, read_snapshot, write_snapshot};
