//! Form rows: editable key/value fields, check marks, and the
//! "add address line" placeholder.

use crate::domain::{
    entities::rule::ValidationRule,
    validation::Sanitizer,
    value_objects::{EditingStyle, ValidationContext},
};

/// What a row mutation caused. Section code attaches the row index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    /// A rule of `context` flipped.
    ValidationChanged {
        context: ValidationContext,
        is_valid: bool,
        message: Option<String>,
    },
    /// The value of a multiple-choice row changed. Inline rows never emit
    /// this; their editor already shows the new text.
    ValueChanged,
}

// ── EditableKeyValueRow ──────────────────────────────────────────────────────

/// One form field.
#[derive(Debug, Clone)]
pub struct EditableKeyValueRow {
    label: String,
    wire_key: String,
    value: Option<String>,
    id_value: Option<String>,
    placeholder: String,
    editing_style: EditingStyle,
    rules: Vec<ValidationRule>,
    sanitizer: Option<Sanitizer>,
}

impl EditableKeyValueRow {
    pub fn new(
        label: impl Into<String>,
        wire_key: impl Into<String>,
        editing_style: EditingStyle,
    ) -> Self {
        Self {
            label: label.into(),
            wire_key: wire_key.into(),
            value: None,
            id_value: None,
            placeholder: String::new(),
            editing_style,
            rules: Vec::new(),
            sanitizer: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn wire_key(&self) -> &str {
        &self.wire_key
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn id_value(&self) -> Option<&str> {
        self.id_value.as_deref()
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn editing_style(&self) -> EditingStyle {
        self.editing_style
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// The transmitted code for picker rows, otherwise the text.
    pub fn wire_value(&self) -> Option<&str> {
        self.id_value().or(self.value())
    }

    /// Set the code sent on the wire. Does not touch validation.
    pub fn set_id_value(&mut self, id_value: Option<String>) {
        self.id_value = id_value;
    }

    /// Sanitize and store `value`, then re-validate every rule.
    pub fn set_value(&mut self, value: Option<String>) -> Vec<RowEvent> {
        self.value = match (&self.sanitizer, value) {
            (Some(sanitizer), Some(raw)) => Some(sanitizer.apply(&raw)),
            (_, value) => value,
        };

        let mut events = self.validate();
        if self.editing_style == EditingStyle::MultipleChoice {
            events.push(RowEvent::ValueChanged);
        }
        events
    }

    /// Re-run every rule against the current value.
    pub fn validate(&mut self) -> Vec<RowEvent> {
        let text = self.value.as_deref();
        self.rules
            .iter_mut()
            .filter_map(|rule| rule.validate(text).then(|| flip_event(rule)))
            .collect()
    }

    pub fn first_rule(&self, context: ValidationContext) -> Option<&ValidationRule> {
        self.rules.iter().find(|r| r.context() == context)
    }

    /// Apply the server verdict to the first server-side rule.
    pub fn set_server_verdict(&mut self, message: Option<String>) -> Option<RowEvent> {
        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.context() == ValidationContext::ServerSide)?;
        rule.set_server_verdict(message).then(|| flip_event(rule))
    }

    /// Messages of the rules of `context` that currently fail.
    pub fn validation_errors(&self, context: ValidationContext) -> Vec<String> {
        self.rules
            .iter()
            .filter(|r| r.context() == context)
            .filter_map(|r| r.display_message().map(str::to_owned))
            .collect()
    }

    /// `true` iff no rule of `context` is invalid.
    pub fn is_valid(&self, context: ValidationContext) -> bool {
        self.rules
            .iter()
            .filter(|r| r.context() == context)
            .all(ValidationRule::is_valid)
    }
}

fn flip_event(rule: &ValidationRule) -> RowEvent {
    RowEvent::ValidationChanged {
        context: rule.context(),
        is_valid: rule.is_valid(),
        message: rule.display_message().map(str::to_owned),
    }
}

// ── CheckMarkRow ─────────────────────────────────────────────────────────────

/// A mutually exclusive option within its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMarkRow {
    pub title: String,
    pub is_selected: bool,
}

impl CheckMarkRow {
    pub fn new(title: impl Into<String>, is_selected: bool) -> Self {
        Self {
            title: title.into(),
            is_selected,
        }
    }
}

// ── Row ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Row {
    CheckMark(CheckMarkRow),
    InlineEditable(EditableKeyValueRow),
    /// Tapping it turns it into a real address line.
    AddAddressLine { title: String },
}

impl Row {
    pub fn editable(&self) -> Option<&EditableKeyValueRow> {
        match self {
            Self::InlineEditable(row) => Some(row),
            _ => None,
        }
    }

    pub fn editable_mut(&mut self) -> Option<&mut EditableKeyValueRow> {
        match self {
            Self::InlineEditable(row) => Some(row),
            _ => None,
        }
    }

    pub fn check_mark(&self) -> Option<&CheckMarkRow> {
        match self {
            Self::CheckMark(row) => Some(row),
            _ => None,
        }
    }

    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::CheckMark(_) => "check mark",
            Self::InlineEditable(_) => "editable",
            Self::AddAddressLine { .. } => "add-line placeholder",
        }
    }
}
