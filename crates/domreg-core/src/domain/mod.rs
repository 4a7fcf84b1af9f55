// ============================================================================
//  FORM DOMAIN
// ============================================================================

//! Core domain layer for domreg.
//!
//! Pure form logic: rules, rows, sections, the address layout, and the phone
//! wire format. Nothing in here performs I/O or knows about the registration
//! service; the application layer drives it and publishes what it reports.
//!
//! ## Rules of the layer
//!
//! - **No async, no I/O**: every operation runs synchronously on the caller
//! - **Events are return values**: a mutation returns what it changed,
//!   nothing holds a callback
//! - **Rows are addressed by index**: sections own their rows by value
//!
pub mod dial_codes;
pub mod entities;
pub mod error;
pub mod form;
pub mod phone;
pub mod validation;
pub mod value_objects;

pub use entities::{
    AddressLayout, AddressSlot, CheckMarkRow, EditableKeyValueRow, Row, RowEvent, Section,
    SectionEvent, ValidationRule,
};

pub use error::{DomainError, ErrorCategory};

pub use form::{FormOptions, build_sections};

pub use validation::{Predicate, Sanitizer};

pub use value_objects::{
    CodeName, ContactField, EditingStyle, FieldValue, IndexPath, PhoneField, PrivacyProtection,
    SectionIndex, ValidationContext,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> (Vec<Section>, AddressLayout) {
        let (mut sections, layout) = build_sections(&FormOptions::default());
        for section in &mut sections {
            section.trigger_validation();
        }
        (sections, layout)
    }

    fn form_is_valid(sections: &[Section], context: ValidationContext) -> bool {
        sections.iter().all(|s| s.is_valid(context))
    }

    // ========================================================================
    // Initial state
    // ========================================================================

    #[test]
    fn fresh_form_is_not_submittable() {
        let (sections, _) = form();
        assert!(!form_is_valid(&sections, ValidationContext::ClientSide));
        assert!(form_is_valid(&sections, ValidationContext::ServerSide));
        assert!(sections[SectionIndex::PrivacyProtection.index()].is_submit_enabled());
        assert!(!sections[SectionIndex::ContactInformation.index()].is_submit_enabled());
    }

    // ========================================================================
    // Aggregate AND law
    // ========================================================================

    fn fill_required(sections: &mut [Section], layout: &AddressLayout) {
        let contact = &mut sections[SectionIndex::ContactInformation.index()];
        for (field, text) in [
            (ContactField::FirstName, "Ada"),
            (ContactField::LastName, "Lovelace"),
            (ContactField::Email, "ada@example.com"),
            (ContactField::Country, "United Kingdom"),
        ] {
            contact.update_value(field.index(), FieldValue::text(text)).unwrap();
        }

        let phone = &mut sections[SectionIndex::Phone.index()];
        phone.update_value(PhoneField::CountryCode.index(), FieldValue::text("44")).unwrap();
        phone.update_value(PhoneField::Number.index(), FieldValue::text("07123456789")).unwrap();

        let address = &mut sections[SectionIndex::Address.index()];
        for (slot, text) in [
            (AddressSlot::Line(1), "1 Analytical Row"),
            (AddressSlot::City, "London"),
            (AddressSlot::PostalCode, "N1 1AA"),
        ] {
            let index = layout.index_of(slot).unwrap();
            address.update_value(index, FieldValue::text(text)).unwrap();
        }
    }

    #[test]
    fn form_validity_is_the_and_of_every_row() {
        let (mut sections, layout) = form();
        fill_required(&mut sections, &layout);
        assert!(form_is_valid(&sections, ValidationContext::ClientSide));
        assert!(sections.iter().all(Section::is_submit_enabled));

        let address = &mut sections[SectionIndex::Address.index()];
        let city = layout.index_of(AddressSlot::City).unwrap();
        let events = address.update_value(city, FieldValue::Text(None)).unwrap();
        assert!(events.contains(&SectionEvent::SectionValidated {
            context: ValidationContext::ClientSide,
            is_valid: false,
        }));
        assert!(!form_is_valid(&sections, ValidationContext::ClientSide));
    }

    #[test]
    fn one_server_error_invalidates_the_server_context_only() {
        let (mut sections, layout) = form();
        fill_required(&mut sections, &layout);

        let contact = &mut sections[SectionIndex::ContactInformation.index()];
        contact
            .apply_server_verdict(ContactField::Email.index(), Some("Invalid email".into()))
            .unwrap();

        assert!(!form_is_valid(&sections, ValidationContext::ServerSide));
        assert!(form_is_valid(&sections, ValidationContext::ClientSide));
    }

    // ========================================================================
    // Address layout mirrors the section
    // ========================================================================

    #[test]
    fn layout_and_rows_stay_in_step() {
        let (mut sections, mut layout) = form();
        let address = &mut sections[SectionIndex::Address.index()];

        let at = layout.enable_placeholder().unwrap();
        address
            .insert(form::address_row(&layout, AddressSlot::AddLinePlaceholder), at)
            .unwrap();
        layout.ensure_len(address.len()).unwrap();
        assert!(matches!(
            address.row(at),
            Some(Row::AddAddressLine { title }) if title == "+ Address line 2"
        ));

        let (at, slot) = layout.promote_placeholder().unwrap();
        address.remove(at).unwrap();
        address.insert(form::address_row(&layout, slot), at).unwrap();
        layout.ensure_len(address.len()).unwrap();

        let line = address.row(at).and_then(Row::editable).unwrap();
        assert_eq!(line.wire_key(), "address_2");
    }
}
