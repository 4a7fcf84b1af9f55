//! Infrastructure adapters for domreg.
//!
//! This crate implements the ports defined in `domreg-core::application::ports`.
//! It holds the fixture-backed registration service and the change sinks.

pub mod service;
pub mod sink;

// Re-export commonly used adapters
pub use service::{Fixture, FixtureError, InMemoryDomainService, Operation};
pub use sink::{ChannelSink, RecordingSink};
