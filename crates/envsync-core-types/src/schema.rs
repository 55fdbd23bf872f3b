//! Canonical schema constants for structured logging and events
//!
//! These constants keep log field names stable across crates.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Record identifiers
pub const FIELD_ENTRY_ID: &str = "entry_id";
pub const FIELD_ASSET_ID: &str = "asset_id";
pub const FIELD_CONTENT_TYPE_ID: &str = "content_type_id";
pub const FIELD_LOCALE: &str = "locale";

// Collection sizes
pub const FIELD_ENTRY_COUNT: &str = "entry_count";
pub const FIELD_ASSET_COUNT: &str = "asset_count";
pub const FIELD_DIFF_COUNT: &str = "diff_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
