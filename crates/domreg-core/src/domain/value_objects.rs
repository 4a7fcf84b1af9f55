//! Domain value objects: contexts, section and field identifiers, index paths.
//!
//! # Design
//!
//! These are pure value types: `Copy` where possible and compared by value, with no
//! identity. Row positions inside a section are always addressed by index;
//! the field enums here name the fixed positions of the static sections.
//! The address section is dynamic and is addressed through
//! [`AddressLayout`](crate::domain::AddressLayout) instead.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ValidationContext ────────────────────────────────────────────────────────

/// Scope of a validation rule.
///
/// `ClientSide` rules decide whether the form may be submitted.
/// `ServerSide` rules carry the verdict of the remote pre-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationContext {
    ClientSide,
    ServerSide,
}

impl ValidationContext {
    pub const ALL: [Self; 2] = [Self::ClientSide, Self::ServerSide];

    /// The context whose section aggregate is cached and drives the
    /// "submit enabled" state.
    pub const SUBMIT: Self = Self::ClientSide;

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ClientSide => "client-side",
            Self::ServerSide => "server-side",
        }
    }
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── EditingStyle ─────────────────────────────────────────────────────────────

/// How an editable row receives its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditingStyle {
    /// Free text typed in place.
    Inline,
    /// Picked from a list (country, state); displayed text may differ from
    /// the transmitted id-value.
    MultipleChoice,
}

// ── SectionIndex ─────────────────────────────────────────────────────────────

/// The four sections of the registration form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionIndex {
    PrivacyProtection,
    ContactInformation,
    Phone,
    Address,
}

impl SectionIndex {
    pub const ALL: [Self; 4] = [
        Self::PrivacyProtection,
        Self::ContactInformation,
        Self::Phone,
        Self::Address,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::PrivacyProtection => 0,
            Self::ContactInformation => 1,
            Self::Phone => 2,
            Self::Address => 3,
        }
    }

    pub fn from_index(index: usize) -> Result<Self, DomainError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(DomainError::SectionOutOfBounds(index))
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PrivacyProtection => "privacy",
            Self::ContactInformation => "contact information",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for SectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── IndexPath ────────────────────────────────────────────────────────────────

/// Position of a row: section plus row index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexPath {
    pub section: SectionIndex,
    pub row: usize,
}

impl IndexPath {
    pub const fn new(section: SectionIndex, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.section, self.row)
    }
}

// ── CodeName ─────────────────────────────────────────────────────────────────

/// A picker entry: transmitted code plus displayed name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeName {
    pub code: String,
    pub name: String,
}

impl CodeName {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

// ── PrivacyProtection ────────────────────────────────────────────────────────

/// The two check-mark rows of the privacy section, by row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrivacyProtection {
    #[default]
    #[serde(rename = "private", alias = "privately")]
    Privately,
    #[serde(rename = "public", alias = "publicly")]
    Publicly,
}

impl PrivacyProtection {
    pub const WIRE_KEY: &'static str = "privacy_protection";

    pub const fn index(self) -> usize {
        match self {
            Self::Privately => 0,
            Self::Publicly => 1,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Privately),
            1 => Some(Self::Publicly),
            _ => None,
        }
    }

    /// Value sent under [`Self::WIRE_KEY`].
    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::Privately => "0",
            Self::Publicly => "1",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Privately => "private",
            Self::Publicly => "public",
        }
    }
}

impl fmt::Display for PrivacyProtection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacyProtection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "private" | "privately" => Ok(Self::Privately),
            "public" | "publicly" => Ok(Self::Publicly),
            other => Err(format!("unknown privacy setting: {other}")),
        }
    }
}

// ── ContactField ─────────────────────────────────────────────────────────────

/// Rows of the contact-information section, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    FirstName,
    LastName,
    Organization,
    Email,
    Country,
}

impl ContactField {
    pub const ALL: [Self; 5] = [
        Self::FirstName,
        Self::LastName,
        Self::Organization,
        Self::Email,
        Self::Country,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::FirstName => 0,
            Self::LastName => 1,
            Self::Organization => 2,
            Self::Email => 3,
            Self::Country => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn wire_key(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Organization => "organization",
            Self::Email => "email",
            Self::Country => "country_code",
        }
    }
}

// ── PhoneField ───────────────────────────────────────────────────────────────

/// Rows of the phone section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhoneField {
    CountryCode,
    Number,
}

impl PhoneField {
    pub const ALL: [Self; 2] = [Self::CountryCode, Self::Number];

    pub const fn index(self) -> usize {
        match self {
            Self::CountryCode => 0,
            Self::Number => 1,
        }
    }

    pub const fn wire_key(self) -> &'static str {
        match self {
            Self::CountryCode => "phone_country_code",
            Self::Number => "phone",
        }
    }
}

// ── FieldValue ───────────────────────────────────────────────────────────────

/// A value handed to a row from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Text for an editable row; `None` clears it.
    Text(Option<String>),
    /// Selection for a check-mark row. Only `true` has an effect.
    Selected(bool),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }

    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Selected(_) => "a selection",
        }
    }
}
