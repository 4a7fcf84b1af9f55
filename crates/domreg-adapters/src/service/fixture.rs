//! Fixture files describing a registration backend.
//!
//! A fixture fully scripts [`InMemoryDomainService`](super::InMemoryDomainService):
//! the reference data it serves, the stored contact details, and how the
//! pre-check, purchase and primary-domain calls answer.
//!
//! # Format
//!
//! JSON (`.json`) or TOML (`.toml`). Every key is optional.
//!
//! ```toml
//! latency_ms = 50
//! failing_operations = ["get_states"]
//!
//! [[countries]]
//! code = "GB"
//! name = "United Kingdom"
//!
//! [[states.US]]
//! code = "OH"
//! name = "Ohio"
//!
//! [contact_information]
//! first_name   = "Ada"
//! phone        = "+44.7123456789"
//! country_code = "GB"
//!
//! [validation]
//! success = false
//! messages = { email = ["Invalid email"] }
//!
//! [purchase]
//! fail = false
//!
//! [set_primary]
//! fail = true
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use domreg_core::{
    application::{Country, DomainContactInformation, State, ValidationMessages, ValidationResponse},
    error::DomregError,
};

/// Errors raised while reading a fixture file.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON fixture {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML fixture {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported fixture format for {path} (expected .json or .toml)")]
    UnsupportedFormat { path: PathBuf },
}

impl From<FixtureError> for DomregError {
    fn from(err: FixtureError) -> Self {
        DomregError::configuration(err.to_string())
    }
}

/// How the remote pre-check answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationFixture {
    pub success: bool,
    pub messages: ValidationMessages,
}

impl Default for ValidationFixture {
    fn default() -> Self {
        Self {
            success: true,
            messages: ValidationMessages::new(),
        }
    }
}

impl ValidationFixture {
    pub fn response(&self) -> ValidationResponse {
        ValidationResponse {
            success: self.success,
            messages: (!self.messages.is_empty()).then(|| self.messages.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureFixture {
    pub fail: bool,
}

/// A scripted registration backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub countries: Vec<Country>,
    /// States keyed by upper-case country code.
    pub states: BTreeMap<String, Vec<State>>,
    pub contact_information: DomainContactInformation,
    pub validation: ValidationFixture,
    pub purchase: FailureFixture,
    pub set_primary: FailureFixture,
    /// Operation names (see [`Operation`](super::Operation)) that fail.
    pub failing_operations: Vec<String>,
    /// Delay applied to every call.
    pub latency_ms: u64,
}

impl Fixture {
    /// Load a fixture, picking the parser from the file extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let fixture = match extension.as_deref() {
            Some("json") => Self::from_json(&content).map_err(|source| FixtureError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            Some("toml") => Self::from_toml(&content).map_err(|source| FixtureError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            _ => {
                return Err(FixtureError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };

        debug!(
            countries = fixture.countries.len(),
            state_lists = fixture.states.len(),
            "Fixture loaded"
        );
        Ok(fixture)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Small built-in backend used when no fixture is configured.
    pub fn builtin() -> Self {
        let countries = [
            ("AU", "Australia"),
            ("CA", "Canada"),
            ("DE", "Germany"),
            ("GB", "United Kingdom"),
            ("IE", "Ireland"),
            ("UA", "Ukraine"),
            ("US", "United States"),
        ]
        .into_iter()
        .map(|(code, name)| Country::new(code, name))
        .collect();

        let mut states = BTreeMap::new();
        states.insert(
            "US".to_string(),
            [
                ("CA", "California"),
                ("NY", "New York"),
                ("OH", "Ohio"),
                ("TX", "Texas"),
                ("WA", "Washington"),
            ]
            .into_iter()
            .map(|(code, name)| State::new(code, name))
            .collect(),
        );
        states.insert(
            "CA".to_string(),
            [
                ("BC", "British Columbia"),
                ("ON", "Ontario"),
                ("QC", "Quebec"),
            ]
            .into_iter()
            .map(|(code, name)| State::new(code, name))
            .collect(),
        );
        states.insert(
            "AU".to_string(),
            [("NSW", "New South Wales"), ("VIC", "Victoria")]
                .into_iter()
                .map(|(code, name)| State::new(code, name))
                .collect(),
        );

        Self {
            countries,
            states,
            ..Self::default()
        }
    }

    pub fn states_for(&self, country_code: &str) -> Vec<State> {
        self.states
            .get(&country_code.to_ascii_uppercase())
            .cloned()
            .unwrap_or_default()
    }

    pub fn fails(&self, operation: &str) -> bool {
        self.failing_operations.iter().any(|op| op == operation)
    }
}
