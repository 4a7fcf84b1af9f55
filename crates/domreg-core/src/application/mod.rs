//! Application layer for domreg.
//!
//! This layer contains:
//! - **Services**: the registration view model
//! - **Ports**: the registration service and the change sink
//! - **Change**: notifications published upward
//! - **Errors**: collaborator failures
//!
//! The application layer drives the domain layer and talks to the outside
//! world. Form rules live in `crate::domain`.

pub mod change;
pub mod dto;
pub mod error;
pub mod loading;
pub mod ports;
pub mod services;

pub use change::{Change, RegistrationOutcome};
pub use dto::{
    CartResponse, ContactPayload, Country, DomainContactInformation, DomainSuggestion, State,
    ValidationMessages, ValidationResponse,
};
pub use error::ApplicationError;
pub use loading::LoadingTracker;
pub use ports::{ChangeSink, DomainRegistrationService};
pub use services::RegisterDomainDetailsViewModel;
