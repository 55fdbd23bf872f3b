//! Structured logging facility for envsync
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use envsync_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Every engine phase (`diff`, `resolve`, `filter`, `remap`, `replicate`,
//! `preflight`, `apply`) logs a start event and exactly one end or error event.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
