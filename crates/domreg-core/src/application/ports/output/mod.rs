//! Driven (output) ports - implemented by infrastructure.

use async_trait::async_trait;

use crate::application::change::Change;
use crate::application::dto::{
    CartResponse, ContactPayload, Country, DomainContactInformation, DomainSuggestion, State,
    ValidationResponse,
};
use crate::error::DomregResult;

/// Port for the remote registration service.
///
/// Implemented by:
/// - `domreg_adapters::service::InMemoryDomainService` (fixtures, tests)
///
/// Every call is independent; the view model never retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainRegistrationService: Send + Sync {
    /// Server-side pre-check of the serialized form.
    async fn validate_domain_contact_information(
        &self,
        payload: &ContactPayload,
        domain_names: &[String],
    ) -> DomregResult<ValidationResponse>;

    /// Contact details stored on the account, used for prefill.
    async fn get_domain_contact_information(&self) -> DomregResult<DomainContactInformation>;

    async fn get_supported_countries(&self) -> DomregResult<Vec<Country>>;

    async fn get_states(&self, country_code: &str) -> DomregResult<Vec<State>>;

    /// Buy `domain` with the site's domain credit. Returns the registered
    /// domain name.
    async fn purchase_domain(
        &self,
        site_id: u64,
        domain: &DomainSuggestion,
        payload: &ContactPayload,
        privacy_protection: bool,
    ) -> DomregResult<String>;

    async fn create_shopping_cart(
        &self,
        site_id: u64,
        domain: &DomainSuggestion,
        privacy_protection: bool,
    ) -> DomregResult<CartResponse>;

    async fn redeem_cart_using_credits(
        &self,
        cart: &CartResponse,
        payload: &ContactPayload,
    ) -> DomregResult<()>;

    async fn set_primary_domain(&self, site_id: u64, domain: &str) -> DomregResult<()>;
}

/// Port receiving form notifications.
///
/// Any `Fn(Change) + Send + Sync` closure is a sink.
pub trait ChangeSink: Send + Sync {
    fn publish(&self, change: Change);
}

impl<F> ChangeSink for F
where
    F: Fn(Change) + Send + Sync,
{
    fn publish(&self, change: Change) {
        self(change)
    }
}
