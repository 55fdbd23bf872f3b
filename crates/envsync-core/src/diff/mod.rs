//! Snapshot diff engine.
//!
//! Pairs entries and content types of two snapshots by id and classifies
//! each as new, modified or deleted, relative to the target.
//!
//! ## Entry point
//!
//! ```
//! use envsync_core::diff::{compare, render_summary};
//! use envsync_core::model::Snapshot;
//!
//! let comparison = compare(&Snapshot::default(), &Snapshot::default());
//! assert!(comparison.is_empty());
//! let _summary = render_summary(&comparison);
//! ```
//!
//! ## Guarantees
//!
//! - **Reflexivity**: comparing a snapshot with itself reports nothing.
//! - **Field-level equality**: version counters and other `sys` metadata are
//!   never treated as changes; only field values per locale are compared.
//! - **Unordered output**: items come in source order then target order;
//!   use [`engine::sort_by_title`] for display.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::{
    compare, diff_content_types, diff_entries, discover_locales, resolve_title, sort_by_title,
};
pub use human_summary::render_summary;
pub use model::{Comparison, ContentTypeDiffItem, DiffItem, DiffStatus};
