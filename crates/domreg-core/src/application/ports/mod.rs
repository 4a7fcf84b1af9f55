//! Application ports (traits) for external dependencies.
//!
//! Adapters in `domreg-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: called by the view model, implemented by infrastructure
//!   - `DomainRegistrationService`: reference data, pre-check, purchase
//!   - `ChangeSink`: receives every [`Change`](crate::application::Change)
//!
//! - **Driving (Input) Ports**: the public methods of
//!   [`RegisterDomainDetailsViewModel`](crate::application::RegisterDomainDetailsViewModel)

pub mod output;

pub use output::{ChangeSink, DomainRegistrationService};

#[cfg(test)]
pub use output::MockDomainRegistrationService;
