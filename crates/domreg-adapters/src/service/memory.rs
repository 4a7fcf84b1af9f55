//! In-memory registration service driven by a [`Fixture`].

use std::{
    collections::HashMap,
    fmt,
    path::Path,
    str::FromStr,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use async_trait::async_trait;
use tracing::{debug, info, trace};

use domreg_core::{
    application::{
        ApplicationError, CartResponse, ContactPayload, Country, DomainContactInformation,
        DomainSuggestion, State, ValidationResponse, ports::DomainRegistrationService,
    },
    error::DomregResult,
};

use super::fixture::{Fixture, FixtureError};

/// Calls the service answers; names match `failing_operations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ValidateDomainContactInformation,
    GetDomainContactInformation,
    GetSupportedCountries,
    GetStates,
    PurchaseDomain,
    CreateShoppingCart,
    RedeemCartUsingCredits,
    SetPrimaryDomain,
}

impl Operation {
    pub const ALL: [Self; 8] = [
        Self::ValidateDomainContactInformation,
        Self::GetDomainContactInformation,
        Self::GetSupportedCountries,
        Self::GetStates,
        Self::PurchaseDomain,
        Self::CreateShoppingCart,
        Self::RedeemCartUsingCredits,
        Self::SetPrimaryDomain,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidateDomainContactInformation => "validate_domain_contact_information",
            Self::GetDomainContactInformation => "get_domain_contact_information",
            Self::GetSupportedCountries => "get_supported_countries",
            Self::GetStates => "get_states",
            Self::PurchaseDomain => "purchase_domain",
            Self::CreateShoppingCart => "create_shopping_cart",
            Self::RedeemCartUsingCredits => "redeem_cart_using_credits",
            Self::SetPrimaryDomain => "set_primary_domain",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operation: {s}"))
    }
}

#[derive(Debug, Default)]
struct ServiceState {
    fixture: Fixture,
    calls: Vec<Operation>,
    payloads: Vec<ContactPayload>,
    carts: u64,
    registered: Vec<(u64, String)>,
    primary: HashMap<u64, String>,
}

/// Thread-safe fixture-backed service.
///
/// Clones share state, so a test can keep one handle and inspect what the
/// view model did through the other.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDomainService {
    inner: Arc<RwLock<ServiceState>>,
}

impl InMemoryDomainService {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ServiceState {
                fixture,
                ..ServiceState::default()
            })),
        }
    }

    /// Service backed by [`Fixture::builtin`].
    pub fn builtin() -> Self {
        Self::new(Fixture::builtin())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        Fixture::load(path).map(Self::new)
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        self.read().map(|s| s.calls.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls().iter().filter(|op| **op == operation).count()
    }

    /// Payloads sent to the pre-check and to credit redemption.
    pub fn payloads(&self) -> Vec<ContactPayload> {
        self.read().map(|s| s.payloads.clone()).unwrap_or_default()
    }

    /// `(site id, domain)` of every completed purchase.
    pub fn registered_domains(&self) -> Vec<(u64, String)> {
        self.read().map(|s| s.registered.clone()).unwrap_or_default()
    }

    pub fn primary_domain(&self, site_id: u64) -> Option<String> {
        self.read().ok()?.primary.get(&site_id).cloned()
    }

    fn read(&self) -> DomregResult<RwLockReadGuard<'_, ServiceState>> {
        self.inner.read().map_err(|_| {
            ApplicationError::LockPoisoned {
                name: "in-memory domain service",
            }
            .into()
        })
    }

    fn write(&self) -> DomregResult<RwLockWriteGuard<'_, ServiceState>> {
        self.inner.write().map_err(|_| {
            ApplicationError::LockPoisoned {
                name: "in-memory domain service",
            }
            .into()
        })
    }

    /// Record the call, wait out the configured latency, and fail it if
    /// the fixture says so.
    async fn enter(&self, operation: Operation) -> DomregResult<()> {
        let (latency, fails) = {
            let mut state = self.write()?;
            state.calls.push(operation);
            (
                state.fixture.latency_ms,
                state.fixture.fails(operation.as_str()),
            )
        };

        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if fails {
            debug!(%operation, "Simulated failure");
            return Err(ApplicationError::request_failed(operation.as_str(), "simulated failure").into());
        }
        trace!(%operation, "Service call");
        Ok(())
    }
}

#[async_trait]
impl DomainRegistrationService for InMemoryDomainService {
    async fn validate_domain_contact_information(
        &self,
        payload: &ContactPayload,
        domain_names: &[String],
    ) -> DomregResult<ValidationResponse> {
        self.enter(Operation::ValidateDomainContactInformation).await?;
        let mut state = self.write()?;
        state.payloads.push(payload.clone());
        let response = state.fixture.validation.response();
        debug!(?domain_names, passed = response.passed(), "Contact details checked");
        Ok(response)
    }

    async fn get_domain_contact_information(&self) -> DomregResult<DomainContactInformation> {
        self.enter(Operation::GetDomainContactInformation).await?;
        Ok(self.read()?.fixture.contact_information.clone())
    }

    async fn get_supported_countries(&self) -> DomregResult<Vec<Country>> {
        self.enter(Operation::GetSupportedCountries).await?;
        Ok(self.read()?.fixture.countries.clone())
    }

    async fn get_states(&self, country_code: &str) -> DomregResult<Vec<State>> {
        self.enter(Operation::GetStates).await?;
        Ok(self.read()?.fixture.states_for(country_code))
    }

    /// Cart creation followed by credit redemption.
    async fn purchase_domain(
        &self,
        site_id: u64,
        domain: &DomainSuggestion,
        payload: &ContactPayload,
        privacy_protection: bool,
    ) -> DomregResult<String> {
        self.enter(Operation::PurchaseDomain).await?;
        let cart = self
            .create_shopping_cart(site_id, domain, privacy_protection)
            .await?;
        self.redeem_cart_using_credits(&cart, payload).await?;

        self.write()?
            .registered
            .push((site_id, domain.domain_name.clone()));
        info!(site_id, domain = %domain.domain_name, "Domain registered");
        Ok(domain.domain_name.clone())
    }

    async fn create_shopping_cart(
        &self,
        site_id: u64,
        domain: &DomainSuggestion,
        privacy_protection: bool,
    ) -> DomregResult<CartResponse> {
        self.enter(Operation::CreateShoppingCart).await?;
        let mut state = self.write()?;
        state.carts += 1;
        Ok(CartResponse {
            cart_key: format!("cart-{site_id}-{}", state.carts),
            domain_name: domain.domain_name.clone(),
            privacy_protection,
        })
    }

    async fn redeem_cart_using_credits(
        &self,
        cart: &CartResponse,
        payload: &ContactPayload,
    ) -> DomregResult<()> {
        self.enter(Operation::RedeemCartUsingCredits).await?;
        let mut state = self.write()?;
        state.payloads.push(payload.clone());
        if state.fixture.purchase.fail {
            return Err(ApplicationError::request_failed(
                Operation::RedeemCartUsingCredits.as_str(),
                format!("no domain credit for {}", cart.domain_name),
            )
            .into());
        }
        Ok(())
    }

    async fn set_primary_domain(&self, site_id: u64, domain: &str) -> DomregResult<()> {
        self.enter(Operation::SetPrimaryDomain).await?;
        let mut state = self.write()?;
        if state.fixture.set_primary.fail {
            return Err(ApplicationError::request_failed(
                Operation::SetPrimaryDomain.as_str(),
                "site does not accept primary domain changes",
            )
            .into());
        }
        state.primary.insert(site_id, domain.to_owned());
        Ok(())
    }
}
