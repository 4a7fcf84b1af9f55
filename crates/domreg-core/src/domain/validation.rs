//! Predicates and sanitizers attached to editable rows.

use std::fmt;
use std::sync::Arc;

/// Client check run by a [`ValidationRule`](crate::domain::ValidationRule).
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(Option<&str>) -> bool + Send + Sync>);

impl Predicate {
    pub fn new(f: impl Fn(Option<&str>) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Valid iff the text is present and not only whitespace.
    pub fn non_empty() -> Self {
        Self::new(|text| text.is_some_and(|t| !t.trim().is_empty()))
    }

    pub fn check(&self, text: Option<&str>) -> bool {
        (self.0)(text)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Normalizes a raw value before it is stored, validated and serialized.
#[derive(Clone)]
pub struct Sanitizer(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl Sanitizer {
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Keeps ASCII digits only.
    pub fn digits_only() -> Self {
        Self::new(|raw| raw.chars().filter(char::is_ascii_digit).collect())
    }

    pub fn apply(&self, raw: &str) -> String {
        (self.0)(raw)
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sanitizer(..)")
    }
}
