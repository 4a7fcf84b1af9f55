//! Row templates for the four sections of the registration form.

use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::{
        AddressLayout, AddressSlot, CheckMarkRow, EditableKeyValueRow, Row, Section, ValidationRule,
    },
    validation::{Predicate, Sanitizer},
    value_objects::{ContactField, EditingStyle, PhoneField, PrivacyProtection, SectionIndex},
};

/// User-facing strings.
pub mod messages {
    pub const PREFILL_ERROR: &str =
        "We couldn't load your saved contact details. Please fill in the form manually.";
    pub const STATES_FETCH_ERROR: &str =
        "We couldn't load the list of states for that country. Please try again.";
    pub const UNEXPECTED_ERROR: &str =
        "There was a problem checking your contact details. Please try again.";
    pub const REDEMPTION_ERROR: &str =
        "We couldn't register the domain. Your domain credit was not used.";
}

/// Knobs the host application may turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOptions {
    pub max_extra_address_lines: usize,
    pub default_privacy: PrivacyProtection,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            max_extra_address_lines: AddressLayout::DEFAULT_MAX_EXTRA_LINES,
            default_privacy: PrivacyProtection::Privately,
        }
    }
}

/// The four sections in [`SectionIndex`] order plus the address layout
/// that describes the last one.
pub fn build_sections(options: &FormOptions) -> (Vec<Section>, AddressLayout) {
    let layout = AddressLayout::new(options.max_extra_address_lines);
    let address_rows = layout
        .slots()
        .iter()
        .map(|slot| address_row(&layout, *slot))
        .collect();

    let sections = vec![
        Section::new(
            SectionIndex::PrivacyProtection,
            privacy_rows(options.default_privacy),
        ),
        Section::new(SectionIndex::ContactInformation, contact_rows()),
        Section::new(SectionIndex::Phone, phone_rows()),
        Section::new(SectionIndex::Address, address_rows),
    ];
    (sections, layout)
}

fn privacy_rows(selected: PrivacyProtection) -> Vec<Row> {
    [
        (PrivacyProtection::Privately, "Register privately with Privacy Protection"),
        (PrivacyProtection::Publicly, "Register publicly"),
    ]
    .into_iter()
    .map(|(choice, title)| Row::CheckMark(CheckMarkRow::new(title, choice == selected)))
    .collect()
}

fn required(row: EditableKeyValueRow, message: &str) -> EditableKeyValueRow {
    row.with_rule(ValidationRule::client(Predicate::non_empty(), message))
        .with_rule(ValidationRule::server())
}

fn optional(row: EditableKeyValueRow) -> EditableKeyValueRow {
    row.with_rule(ValidationRule::server())
}

fn contact_rows() -> Vec<Row> {
    ContactField::ALL
        .into_iter()
        .map(|field| {
            let key = field.wire_key();
            let row = match field {
                ContactField::FirstName => required(
                    EditableKeyValueRow::new("First Name", key, EditingStyle::Inline)
                        .with_placeholder("First name"),
                    "Please enter a first name",
                ),
                ContactField::LastName => required(
                    EditableKeyValueRow::new("Last Name", key, EditingStyle::Inline)
                        .with_placeholder("Last name"),
                    "Please enter a last name",
                ),
                ContactField::Organization => optional(
                    EditableKeyValueRow::new("Organization", key, EditingStyle::Inline)
                        .with_placeholder("Organization (optional)"),
                ),
                ContactField::Email => required(
                    EditableKeyValueRow::new("Email", key, EditingStyle::Inline)
                        .with_placeholder("Email"),
                    "Please enter an email address",
                ),
                ContactField::Country => required(
                    EditableKeyValueRow::new("Country", key, EditingStyle::MultipleChoice)
                        .with_placeholder("Select Country"),
                    "Please select a country",
                ),
            };
            Row::InlineEditable(row)
        })
        .collect()
}

fn phone_rows() -> Vec<Row> {
    PhoneField::ALL
        .into_iter()
        .map(|field| {
            let row = match field {
                PhoneField::CountryCode => required(
                    EditableKeyValueRow::new("Country Code", field.wire_key(), EditingStyle::Inline)
                        .with_placeholder("+1"),
                    "Please enter a country calling code",
                ),
                PhoneField::Number => required(
                    EditableKeyValueRow::new("Phone", field.wire_key(), EditingStyle::Inline)
                        .with_placeholder("Phone number"),
                    "Please enter a phone number",
                ),
            };
            Row::InlineEditable(row.with_sanitizer(Sanitizer::digits_only()))
        })
        .collect()
}

/// Row for an address slot of `layout`. The placeholder is titled after
/// the line it will become.
pub fn address_row(layout: &AddressLayout, slot: AddressSlot) -> Row {
    let key = slot.wire_key().unwrap_or_default();
    let row = match slot {
        AddressSlot::Line(1) => required(
            EditableKeyValueRow::new("Address", key, EditingStyle::Inline)
                .with_placeholder("Address line 1"),
            "Please enter an address",
        ),
        AddressSlot::Line(n) => optional(
            EditableKeyValueRow::new("Address", key, EditingStyle::Inline)
                .with_placeholder(format!("Address line {n}")),
        ),
        AddressSlot::AddLinePlaceholder => {
            return Row::AddAddressLine {
                title: add_line_title(layout.next_line_number()),
            };
        }
        AddressSlot::City => required(
            EditableKeyValueRow::new("City", key, EditingStyle::Inline).with_placeholder("City"),
            "Please enter a city",
        ),
        AddressSlot::State => optional(
            EditableKeyValueRow::new("State", key, EditingStyle::MultipleChoice)
                .with_placeholder("Select State"),
        ),
        AddressSlot::PostalCode => required(
            EditableKeyValueRow::new("Postal Code", key, EditingStyle::Inline)
                .with_placeholder("Postal code"),
            "Please enter a postal code",
        ),
    };
    Row::InlineEditable(row)
}

/// Title of the placeholder that will become line `line_number`.
pub fn add_line_title(line_number: usize) -> String {
    format!("+ Address line {line_number}")
}
