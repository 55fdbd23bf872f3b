//! Error handling for envsync-store
//!
//! Wraps envsync-core ExError with store-specific helpers

use envsync_core::errors::{ExError, ExErrorKind, SyncError};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a snapshot format error (unparseable JSON, wrong shape)
pub fn snapshot_format(reason: &str) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("snapshot_parse")
        .with_message(reason.to_string())
}

/// Create a snapshot validation error from a domain error
pub fn snapshot_invalid(err: SyncError) -> ExError {
    ExError::from(err).with_op("snapshot_validate")
}

/// Create a configuration error
pub fn config_invalid(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("config_load")
        .with_message(reason.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
