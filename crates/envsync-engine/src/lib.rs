//! envsync engine - applies a snapshot to a live target store
//!
//! Coordinates the pure comparison engine in `envsync-core` with a target
//! store reached through the [`TargetClient`] port:
//! - [`orchestrator`]: compare / resolve-selection / apply entry points with
//!   per-phase timeouts
//! - [`replicator`]: reproduces each record's publication state
//! - [`preflight`]: reconciles content types before records are written
//! - [`retry`]: backoff for rate-limited calls
//! - [`adapters`]: in-memory and HTTP implementations of the port

pub mod adapters;
pub mod client;
pub mod orchestrator;
pub mod preflight;
pub mod replicator;
pub mod report;
pub mod retry;

pub use client::{ClientResult, TargetClient};
pub use orchestrator::{Orchestrator, PhaseTimeouts};
pub use replicator::{replicate, AppliedAction, RecordKind, ReplicationStep};
pub use report::{FailedRecord, MigrationReport};
pub use retry::{with_retry, RetryPolicy};
