//! Data exchanged with the registration service.
//!
//! Field names follow the service's JSON so adapters can deserialize
//! straight into these types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::CodeName;

/// Serialized form: wire key to wire value.
pub type ContactPayload = BTreeMap<String, String>;

/// A country as the service lists it. Either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: Option<String>,
    pub name: Option<String>,
}

/// A state or province of one country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub code: Option<String>,
    pub name: Option<String>,
}

impl Country {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            name: Some(name.into()),
        }
    }
}

impl State {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            name: Some(name.into()),
        }
    }
}

fn complete(code: Option<&String>, name: Option<&String>) -> Option<CodeName> {
    match (code, name) {
        (Some(code), Some(name)) if !code.is_empty() && !name.is_empty() => {
            Some(CodeName::new(code.as_str(), name.as_str()))
        }
        _ => None,
    }
}

/// Picker entries, dropping records with an empty code or name.
pub fn countries_to_code_names(countries: &[Country]) -> Vec<CodeName> {
    countries
        .iter()
        .filter_map(|c| complete(c.code.as_ref(), c.name.as_ref()))
        .collect()
}

/// Picker entries, dropping records with an empty code or name.
pub fn states_to_code_names(states: &[State]) -> Vec<CodeName> {
    states
        .iter()
        .filter_map(|s| complete(s.code.as_ref(), s.name.as_ref()))
        .collect()
}

/// Contact details stored on the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainContactInformation {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
    /// `+<code>.<number>`.
    pub phone: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    /// State code.
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country_code: Option<String>,
}

/// Per-field messages from the remote pre-check, keyed by wire key.
pub type ValidationMessages = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationResponse {
    pub success: bool,
    pub messages: Option<ValidationMessages>,
}

impl ValidationResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            messages: None,
        }
    }

    pub fn rejected(messages: ValidationMessages) -> Self {
        Self {
            success: false,
            messages: Some(messages),
        }
    }

    /// `true` when at least one field carries a message.
    pub fn has_messages(&self) -> bool {
        self.messages
            .as_ref()
            .is_some_and(|m| m.values().any(|list| !list.is_empty()))
    }

    /// The form may proceed to purchase.
    pub fn passed(&self) -> bool {
        self.success && !self.has_messages()
    }

    /// First message for `wire_key`, if any.
    pub fn first_message(&self, wire_key: &str) -> Option<&str> {
        self.messages
            .as_ref()?
            .get(wire_key)?
            .first()
            .map(String::as_str)
    }
}

/// The domain being registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSuggestion {
    pub domain_name: String,
    #[serde(default)]
    pub product_id: Option<u64>,
    #[serde(default)]
    pub supports_privacy: bool,
}

impl DomainSuggestion {
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            product_id: None,
            supports_privacy: true,
        }
    }
}

/// A shopping cart created ahead of credit redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartResponse {
    pub cart_key: String,
    pub domain_name: String,
    pub privacy_protection: bool,
}
