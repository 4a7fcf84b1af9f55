//! End-to-end runs of the registration form against the fixture service.

use std::{fs, sync::Arc};

use domreg_adapters::{ChannelSink, Fixture, InMemoryDomainService, Operation, RecordingSink};
use domreg_core::application::DomainContactInformation;
use domreg_core::domain::{AddressSlot, ContactField};
use domreg_core::prelude::*;

fn stored_contact() -> DomainContactInformation {
    DomainContactInformation {
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
        email: Some("ada@example.com".into()),
        phone: Some("+1.5551234567".into()),
        address_1: Some("1 Analytical Row".into()),
        address_2: Some("Suite 2".into()),
        city: Some("Columbus".into()),
        state: Some("OH".into()),
        postal_code: Some("43004".into()),
        country_code: Some("US".into()),
        ..DomainContactInformation::default()
    }
}

fn form(
    service: &InMemoryDomainService,
    sink: &RecordingSink,
) -> RegisterDomainDetailsViewModel {
    RegisterDomainDetailsViewModel::new(
        DomainSuggestion::new("example.blog"),
        42,
        FormOptions::default(),
        Arc::new(service.clone()),
        Arc::new(sink.clone()),
    )
}

#[tokio::test]
async fn prefill_then_register_buys_the_domain() {
    let service = InMemoryDomainService::new(Fixture {
        contact_information: stored_contact(),
        ..Fixture::builtin()
    });
    let sink = RecordingSink::new();
    let mut form = form(&service, &sink);

    form.prefill().await;

    assert!(sink.contains(&Change::PrefillSuccess));
    assert!(!form.is_loading());
    assert!(form.is_valid(ValidationContext::ClientSide));
    assert!(form.address_layout().index_of(AddressSlot::Line(2)).is_some());

    let payload = form.json_representation();
    assert_eq!(payload.get("phone").map(String::as_str), Some("+1.5551234567"));
    assert_eq!(payload.get("country_code").map(String::as_str), Some("US"));
    assert_eq!(payload.get("state").map(String::as_str), Some("OH"));
    assert_eq!(payload.get("address_2").map(String::as_str), Some("Suite 2"));
    assert_eq!(
        payload.get("privacy_protection").map(String::as_str),
        Some("0")
    );

    sink.take();
    let outcome = form.register().await;

    assert_eq!(
        outcome,
        RegistrationOutcome::Registered {
            domain: "example.blog".into(),
            primary: true,
        }
    );
    assert_eq!(service.registered_domains(), vec![(42, "example.blog".into())]);
    assert_eq!(service.primary_domain(42).as_deref(), Some("example.blog"));

    let changes = sink.changes();
    assert_eq!(changes.first(), Some(&Change::Loading(true)));
    assert_eq!(
        &changes[changes.len() - 3..],
        &[
            Change::Loading(false),
            Change::RegisterSucceeded {
                domain: "example.blog".into()
            },
            Change::DomainIsPrimary {
                domain: "example.blog".into()
            },
        ]
    );
}

#[tokio::test]
async fn server_messages_block_the_purchase() {
    let mut fixture = Fixture {
        contact_information: stored_contact(),
        ..Fixture::builtin()
    };
    fixture.validation.success = false;
    fixture
        .validation
        .messages
        .insert("email".into(), vec!["Email is not deliverable".into()]);
    let service = InMemoryDomainService::new(fixture);
    let sink = RecordingSink::new();
    let mut form = form(&service, &sink);

    form.prefill().await;
    let outcome = form.register().await;

    assert_eq!(outcome, RegistrationOutcome::Rejected);
    assert!(sink.contains(&Change::RemoteValidationFinished));
    assert_eq!(service.call_count(Operation::PurchaseDomain), 0);

    let email = IndexPath::new(SectionIndex::ContactInformation, ContactField::Email.index());
    assert_eq!(
        form.validation_errors(ValidationContext::ServerSide),
        vec![(email, "Email is not deliverable".to_string())]
    );
    assert!(form.is_valid(ValidationContext::ClientSide));
}

#[tokio::test]
async fn failed_primary_assignment_keeps_the_purchase() {
    let mut fixture = Fixture {
        contact_information: stored_contact(),
        ..Fixture::builtin()
    };
    fixture.set_primary.fail = true;
    let service = InMemoryDomainService::new(fixture);
    let sink = RecordingSink::new();
    let mut form = form(&service, &sink);

    form.prefill().await;
    let outcome = form.register().await;

    assert_eq!(
        outcome,
        RegistrationOutcome::Registered {
            domain: "example.blog".into(),
            primary: false,
        }
    );
    assert!(!sink.changes().iter().any(|c| matches!(c, Change::DomainIsPrimary { .. })));
    assert_eq!(service.primary_domain(42), None);
}

#[tokio::test]
async fn country_failure_reports_a_prefill_error() {
    let service = InMemoryDomainService::new(Fixture {
        failing_operations: vec![Operation::GetSupportedCountries.to_string()],
        ..Fixture::builtin()
    });
    let sink = RecordingSink::new();
    let mut form = form(&service, &sink);

    form.prefill().await;

    let changes = sink.changes();
    assert!(matches!(changes.last(), Some(Change::PrefillError { .. })));
    assert_eq!(
        changes.iter().filter(|c| matches!(c, Change::Loading(_))).count(),
        2
    );
    assert!(form.countries().is_empty());
}

#[tokio::test]
async fn fixture_file_drives_the_channel_sink() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backend.toml");
    fs::write(
        &path,
        r#"
        [[countries]]
        code = "CA"
        name = "Canada"

        [[states.CA]]
        code = "ON"
        name = "Ontario"
        "#,
    )
    .unwrap();

    let service = InMemoryDomainService::from_path(&path).unwrap();
    let (sink, mut rx) = ChannelSink::new();
    let mut form = RegisterDomainDetailsViewModel::new(
        DomainSuggestion::new("example.ca"),
        7,
        FormOptions::default(),
        Arc::new(service),
        Arc::new(sink),
    );

    form.prefill().await;
    form.select_country(0).await;
    form.select_state(0);
    drop(form);

    let mut received = Vec::new();
    while let Some(change) = rx.recv().await {
        received.push(change);
    }
    assert_eq!(
        received.iter().filter(|c| **c == Change::PrefillSuccess).count(),
        2
    );
    assert!(
        received
            .iter()
            .any(|c| matches!(c, Change::MultipleChoiceRowValueChanged { .. }))
    );
}
