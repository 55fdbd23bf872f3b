//! envsync core - pure comparison and selection engine
//!
//! This crate holds everything that runs without touching a remote store:
//! - Snapshot data model (content types, entries, assets, locales) with a
//!   typed field-value tree
//! - Reference walker over field trees, including rich-text embeds
//! - Diff engine classifying entries and content types as new, modified or
//!   deleted
//! - Dependency resolver computing the closure of a selection
//! - Selection filter and locale remapper producing the snapshot to apply
//! - Error and logging facilities shared by the other envsync crates

pub mod diff;
pub mod errors;
pub mod filter;
pub mod locale;
pub mod logging_facility;
pub mod model;
pub mod resolver;
pub mod rules;
pub mod walker;

// Re-export commonly used types
pub use diff::{compare, Comparison, DiffItem, DiffStatus};
pub use errors::{ExError, ExErrorKind, Result, SyncError};
pub use filter::filter;
pub use locale::{default_locale, remap};
pub use model::{Asset, ContentType, Entry, Locale, Selection, Snapshot, SysStatus};
pub use resolver::{resolve, Resolved};
pub use rules::validate_snapshot;
pub use walker::{walk, walk_fields, Reference};
