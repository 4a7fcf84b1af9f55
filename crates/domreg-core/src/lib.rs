//! Domreg Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for filling in,
//! validating and submitting domain-registration contact details, following
//! hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            domreg-cli (CLI)             │
//! │      (Drives the view model)            │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │    (RegisterDomainDetailsViewModel)     │
//! │   prefill · edit · pre-check · buy      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │       Application Ports (Traits)        │
//! │ (DomainRegistrationService, ChangeSink) │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │   domreg-adapters (Infrastructure)      │
//! │ (InMemoryDomainService, ChannelSink)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │  (ValidationRule, Row, Section, Layout) │
//! │           No I/O, no async              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domreg_core::prelude::*;
//!
//! # async fn run(service: Arc<dyn DomainRegistrationService>) {
//! let sink: Arc<dyn ChangeSink> = Arc::new(|change: Change| println!("{change:?}"));
//! let mut form = RegisterDomainDetailsViewModel::new(
//!     DomainSuggestion::new("example.blog"),
//!     42,
//!     FormOptions::default(),
//!     service,
//!     sink,
//! );
//!
//! form.prefill().await;
//! if form.is_valid(ValidationContext::ClientSide) {
//!     let outcome = form.register().await;
//!     println!("{outcome:?}");
//! }
//! # }
//! ```

// Domain layer (form logic)
pub mod domain;

// Application layer (orchestration)
pub mod application;

// Error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        Change, ChangeSink, ContactPayload, DomainRegistrationService, DomainSuggestion,
        RegisterDomainDetailsViewModel, RegistrationOutcome,
    };
    pub use crate::domain::{
        AddressSlot, FieldValue, FormOptions, IndexPath, PrivacyProtection, Row, SectionIndex,
        ValidationContext,
    };
    pub use crate::error::{DomregError, DomregResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
