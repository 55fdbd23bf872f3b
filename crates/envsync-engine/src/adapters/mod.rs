//! `TargetClient` implementations

pub mod http;
pub mod memory;

pub use http::HttpTargetClient;
pub use memory::{ClientCall, InMemoryTargetClient};
