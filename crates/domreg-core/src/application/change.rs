//! Notifications published to the presentation layer.

use serde::Serialize;

use crate::domain::{IndexPath, SectionIndex, ValidationContext};

/// Everything the form reports upward, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    RowValidated {
        context: ValidationContext,
        index_path: IndexPath,
        is_valid: bool,
        message: Option<String>,
    },
    SectionValidated {
        context: ValidationContext,
        section: SectionIndex,
        is_valid: bool,
    },
    /// Always follows a [`Change::SectionValidated`] for the same context.
    FormValidated {
        context: ValidationContext,
        is_valid: bool,
    },
    MultipleChoiceRowValueChanged {
        index_path: IndexPath,
    },
    AddNewAddressLineEnabled {
        index_path: IndexPath,
    },
    AddNewAddressLineReplaced {
        index_path: IndexPath,
    },
    CheckMarkRowsUpdated {
        section: SectionIndex,
    },
    RegisterSucceeded {
        domain: String,
    },
    DomainIsPrimary {
        domain: String,
    },
    Loading(bool),
    RemoteValidationFinished,
    PrefillSuccess,
    PrefillError {
        message: String,
    },
    UnexpectedError {
        message: String,
    },
}

impl Change {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RowValidated { .. } => "row_validated",
            Self::SectionValidated { .. } => "section_validated",
            Self::FormValidated { .. } => "form_validated",
            Self::MultipleChoiceRowValueChanged { .. } => "multiple_choice_row_value_changed",
            Self::AddNewAddressLineEnabled { .. } => "add_new_address_line_enabled",
            Self::AddNewAddressLineReplaced { .. } => "add_new_address_line_replaced",
            Self::CheckMarkRowsUpdated { .. } => "check_mark_rows_updated",
            Self::RegisterSucceeded { .. } => "register_succeeded",
            Self::DomainIsPrimary { .. } => "domain_is_primary",
            Self::Loading(_) => "loading",
            Self::RemoteValidationFinished => "remote_validation_finished",
            Self::PrefillSuccess => "prefill_success",
            Self::PrefillError { .. } => "prefill_error",
            Self::UnexpectedError { .. } => "unexpected_error",
        }
    }
}

/// Result of [`register`](crate::application::RegisterDomainDetailsViewModel::register)
/// for callers that do not consume the change stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RegistrationOutcome {
    /// The domain was bought. `primary` is `false` when making it the
    /// primary domain failed; the purchase stands either way.
    Registered { domain: String, primary: bool },
    /// The remote pre-check flagged fields; their server-side rules now
    /// carry the messages.
    Rejected,
    Failed { message: String },
}

impl RegistrationOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_serialize_with_a_kind_tag() {
        let change = Change::AddNewAddressLineEnabled {
            index_path: IndexPath::new(SectionIndex::Address, 1),
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["kind"], "add_new_address_line_enabled");
        assert_eq!(json["index_path"]["section"], "address");
        assert_eq!(json["index_path"]["row"], 1);
        assert_eq!(change.name(), "add_new_address_line_enabled");
    }
}
