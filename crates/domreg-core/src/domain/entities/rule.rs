//! A single validation predicate with its observable validity flag.

use crate::domain::{validation::Predicate, value_objects::ValidationContext};

/// One check on an editable row.
///
/// A rule without a predicate always validates. Server-side rules are
/// usually predicate-free: their flag and message are written directly from
/// the remote pre-check via [`ValidationRule::set_server_verdict`].
#[derive(Debug, Clone)]
pub struct ValidationRule {
    context: ValidationContext,
    predicate: Option<Predicate>,
    error_message: Option<String>,
    server_error_message: Option<String>,
    is_valid: bool,
}

impl ValidationRule {
    /// A client-side rule that fails with `message` when `predicate` does.
    pub fn client(predicate: Predicate, message: impl Into<String>) -> Self {
        Self {
            context: ValidationContext::ClientSide,
            predicate: Some(predicate),
            error_message: Some(message.into()),
            server_error_message: None,
            is_valid: true,
        }
    }

    /// A server-side marker rule, valid until the server says otherwise.
    pub fn server() -> Self {
        Self {
            context: ValidationContext::ServerSide,
            predicate: None,
            error_message: None,
            server_error_message: None,
            is_valid: true,
        }
    }

    pub fn context(&self) -> ValidationContext {
        self.context
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn server_error_message(&self) -> Option<&str> {
        self.server_error_message.as_deref()
    }

    /// Message to show while the rule is invalid.
    pub fn display_message(&self) -> Option<&str> {
        if self.is_valid {
            return None;
        }
        self.error_message().or(self.server_error_message())
    }

    /// Re-run the predicate against `text`.
    ///
    /// Returns `true` iff the validity flag flipped.
    pub fn validate(&mut self, text: Option<&str>) -> bool {
        let valid = self.predicate.as_ref().is_none_or(|p| p.check(text));
        self.set_valid(valid)
    }

    /// Overwrite the validity flag. Returns `true` iff it flipped.
    pub fn set_valid(&mut self, valid: bool) -> bool {
        let flipped = self.is_valid != valid;
        self.is_valid = valid;
        flipped
    }

    /// Record the server's verdict: a message means invalid, none means valid.
    ///
    /// Returns `true` iff the validity flag flipped.
    pub fn set_server_verdict(&mut self, message: Option<String>) -> bool {
        let flipped = self.set_valid(message.is_none());
        self.server_error_message = message;
        flipped
    }
}
