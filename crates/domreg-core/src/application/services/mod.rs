//! Application services - orchestrate use cases.
//!
//! The registration form is the only use case: prefill it, let the user
//! edit it, pre-check it remotely, and buy the domain.

pub mod registration;

pub use registration::RegisterDomainDetailsViewModel;
