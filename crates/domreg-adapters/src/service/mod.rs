//! Registration service adapters.

pub mod fixture;
pub mod memory;

pub use fixture::{Fixture, FixtureError};
pub use memory::{InMemoryDomainService, Operation};
