//! Registration form view model.
//!
//! Owns the four sections and drives the registration workflow:
//! 1. Prefill from stored contact details (countries and contact info in
//!    parallel, then the states of the stored country)
//! 2. Route edits into the sections and publish what changed
//! 3. Serialize the form, pre-check it remotely, then buy the domain
//!
//! Form operations never return errors. Failures become [`Change`]s.

use std::sync::Arc;

use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use crate::{
    application::{
        change::{Change, RegistrationOutcome},
        dto::{
            ContactPayload, Country, DomainContactInformation, DomainSuggestion,
            ValidationResponse, countries_to_code_names, states_to_code_names,
        },
        loading::LoadingTracker,
        ports::{ChangeSink, DomainRegistrationService},
    },
    domain::{
        AddressLayout, AddressSlot, CodeName, ContactField, DomainError, FieldValue, FormOptions,
        IndexPath, PhoneField, PrivacyProtection, Row, Section, SectionEvent, SectionIndex,
        ValidationContext, build_sections,
        dial_codes::country_dial_code,
        form::{self, messages},
        phone::{format_phone_number, parse_phone_number},
    },
    error::DomregResult,
};

/// State of one domain-registration attempt.
pub struct RegisterDomainDetailsViewModel {
    attempt: Uuid,
    domain: DomainSuggestion,
    site_id: u64,
    sections: Vec<Section>,
    layout: AddressLayout,
    countries: Option<Vec<CodeName>>,
    states: Option<Vec<CodeName>>,
    loading: LoadingTracker,
    service: Arc<dyn DomainRegistrationService>,
    sink: Arc<dyn ChangeSink>,
}

impl RegisterDomainDetailsViewModel {
    /// Build the form and run the initial validation.
    ///
    /// The initial pass only primes the cached aggregates; nothing is
    /// published for it.
    pub fn new(
        domain: DomainSuggestion,
        site_id: u64,
        options: FormOptions,
        service: Arc<dyn DomainRegistrationService>,
        sink: Arc<dyn ChangeSink>,
    ) -> Self {
        let (mut sections, layout) = build_sections(&options);
        for section in &mut sections {
            section.trigger_validation();
        }

        let attempt = Uuid::new_v4();
        debug!(%attempt, domain = %domain.domain_name, site_id, "Registration form created");

        Self {
            attempt,
            domain,
            site_id,
            sections,
            layout,
            countries: None,
            states: None,
            loading: LoadingTracker::default(),
            service,
            sink,
        }
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    pub fn attempt_id(&self) -> Uuid {
        self.attempt
    }

    pub fn domain(&self) -> &DomainSuggestion {
        &self.domain
    }

    pub fn site_id(&self) -> u64 {
        self.site_id
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: SectionIndex) -> &Section {
        &self.sections[index.index()]
    }

    pub fn row(&self, path: IndexPath) -> Option<&Row> {
        self.section(path.section).row(path.row)
    }

    pub fn address_layout(&self) -> &AddressLayout {
        &self.layout
    }

    pub fn countries(&self) -> &[CodeName] {
        self.countries.as_deref().unwrap_or_default()
    }

    pub fn states(&self) -> &[CodeName] {
        self.states.as_deref().unwrap_or_default()
    }

    pub fn country_names(&self) -> Vec<&str> {
        self.countries().iter().map(|c| c.name.as_str()).collect()
    }

    pub fn state_names(&self) -> Vec<&str> {
        self.states().iter().map(|s| s.name.as_str()).collect()
    }

    /// Position of the editable row sent under `wire_key`.
    pub fn index_path_for_key(&self, wire_key: &str) -> Option<IndexPath> {
        self.sections.iter().find_map(|section| {
            section
                .rows()
                .iter()
                .position(|row| row.editable().is_some_and(|r| r.wire_key() == wire_key))
                .map(|row| IndexPath::new(section.index(), row))
        })
    }

    /// Messages of every failing rule of `context`, with their rows.
    pub fn validation_errors(&self, context: ValidationContext) -> Vec<(IndexPath, String)> {
        self.sections
            .iter()
            .flat_map(|section| {
                section.rows().iter().enumerate().flat_map(move |(row, r)| {
                    r.editable()
                        .map(|e| e.validation_errors(context))
                        .unwrap_or_default()
                        .into_iter()
                        .map(move |message| (IndexPath::new(section.index(), row), message))
                })
            })
            .collect()
    }

    /// AND over every section.
    pub fn is_valid(&self, context: ValidationContext) -> bool {
        self.sections.iter().all(|s| s.is_valid(context))
    }

    pub fn privacy_selection(&self) -> Option<PrivacyProtection> {
        self.section(SectionIndex::PrivacyProtection)
            .selected_check_mark()
            .and_then(PrivacyProtection::from_index)
    }

    // ── Editing ───────────────────────────────────────────────────────────

    /// Route a value to the row at `path`. Invalid paths and kind
    /// mismatches are logged and ignored.
    pub fn update_value(&mut self, path: IndexPath, value: FieldValue) {
        match self.section_mut(path.section).update_value(path.row, value) {
            Ok(events) => self.publish(path.section, events),
            Err(err) => warn!(%err, %path, "Ignoring form update"),
        }
    }

    /// Pick a country from the loaded list, then reload its states.
    #[instrument(skip(self), fields(attempt = %self.attempt))]
    pub async fn select_country(&mut self, index: usize) {
        let Some(country) = self.countries.as_ref().and_then(|c| c.get(index)).cloned() else {
            let err = DomainError::PickerIndexOutOfBounds {
                kind: "country",
                index,
                len: self.countries().len(),
            };
            warn!(%err, "Ignoring country selection");
            return;
        };
        info!(code = %country.code, "Country selected");

        let path = IndexPath::new(SectionIndex::ContactInformation, ContactField::Country.index());
        self.set_id_value(path, Some(country.code.clone()));
        self.update_value(path, FieldValue::text(country.name));
        self.fill_dial_code(&country.code);
        self.fetch_states(&country.code).await;
        self.emit(Change::PrefillSuccess);
    }

    /// Pick a state from the loaded list.
    pub fn select_state(&mut self, index: usize) {
        let Some(state) = self.states.as_ref().and_then(|s| s.get(index)).cloned() else {
            let err = DomainError::PickerIndexOutOfBounds {
                kind: "state",
                index,
                len: self.states().len(),
            };
            warn!(%err, "Ignoring state selection");
            return;
        };
        let Some(path) = self.address_path(AddressSlot::State) else {
            return;
        };
        self.set_id_value(path, Some(state.code));
        self.update_value(path, FieldValue::text(state.name));
    }

    /// Replace the state list with the states of `country_code`.
    ///
    /// The current state selection is cleared first. Returns `false` when
    /// the fetch failed; an [`Change::UnexpectedError`] has been published.
    #[instrument(skip(self), fields(attempt = %self.attempt))]
    pub async fn fetch_states(&mut self, country_code: &str) -> bool {
        self.states = None;
        self.clear_state_selection();

        self.begin_loading(1);
        let result = self.service.get_states(country_code).await;
        self.end_loading();

        match result {
            Ok(states) => {
                let states = states_to_code_names(&states);
                debug!(count = states.len(), "States loaded");
                self.states = Some(states);
                true
            }
            Err(err) => {
                warn!(%err, "Could not load states");
                self.emit(Change::UnexpectedError {
                    message: messages::STATES_FETCH_ERROR.into(),
                });
                false
            }
        }
    }

    /// Show the "add address line" placeholder after the last line.
    ///
    /// No-op while a placeholder is shown or the extra-line cap is reached.
    pub fn enable_add_address_row(&mut self) {
        let Some(at) = self.layout.enable_placeholder() else {
            debug!(
                extra_lines = self.layout.extra_line_count(),
                "Add-line placeholder not enabled"
            );
            return;
        };
        let row = form::address_row(&self.layout, AddressSlot::AddLinePlaceholder);
        if let Err(err) = self.section_mut(SectionIndex::Address).insert(row, at) {
            warn!(%err, "Address rows out of step with their layout");
            return;
        }
        self.emit(Change::AddNewAddressLineEnabled {
            index_path: IndexPath::new(SectionIndex::Address, at),
        });
    }

    /// Turn the placeholder into a real address line, then show a fresh
    /// placeholder while the extra-line cap allows one.
    pub fn replace_add_new_address_line(&mut self) {
        let Some((at, slot)) = self.layout.promote_placeholder() else {
            debug!("No add-line placeholder to replace");
            return;
        };
        let row = form::address_row(&self.layout, slot);
        let replaced = {
            let address = self.section_mut(SectionIndex::Address);
            address.remove(at).and_then(|_| address.insert(row, at))
        };
        if let Err(err) = replaced {
            warn!(%err, "Address rows out of step with their layout");
            return;
        }
        self.emit(Change::AddNewAddressLineReplaced {
            index_path: IndexPath::new(SectionIndex::Address, at),
        });
        if self.layout.can_add_line() {
            self.enable_add_address_row();
        }
    }

    // ── Serialization ─────────────────────────────────────────────────────

    /// The form as the service expects it.
    ///
    /// Merge order is privacy, phone, contact information, address; the
    /// first value written for a key wins. Rows without a value are left out.
    pub fn json_representation(&self) -> ContactPayload {
        let mut payload = ContactPayload::new();
        if let Some(choice) = self.privacy_selection() {
            payload.insert(PrivacyProtection::WIRE_KEY.into(), choice.wire_value().into());
        }

        let phone = (PhoneField::Number.wire_key().to_owned(), self.formatted_phone_number());
        let rows = [SectionIndex::ContactInformation, SectionIndex::Address]
            .into_iter()
            .flat_map(|index| self.section(index).wire_entries())
            .map(|(key, value)| (key.to_owned(), value.to_owned()));

        for (key, value) in std::iter::once(phone).chain(rows) {
            payload.entry(key).or_insert(value);
        }
        payload
    }

    fn formatted_phone_number(&self) -> String {
        let phone = self.section(SectionIndex::Phone);
        let text = |field: PhoneField| {
            phone
                .row(field.index())
                .and_then(Row::editable)
                .and_then(|r| r.value())
                .unwrap_or_default()
        };
        format_phone_number(text(PhoneField::CountryCode), text(PhoneField::Number))
    }

    // ── Prefill ───────────────────────────────────────────────────────────

    /// Load countries and stored contact details, then fill the form.
    ///
    /// Both fetches run concurrently and count as one loading wave together
    /// with the states fetch that follows. The outcome change is published
    /// after the wave ends.
    #[instrument(
        skip_all,
        fields(attempt = %self.attempt, domain = %self.domain.domain_name, site_id = self.site_id)
    )]
    pub async fn prefill(&mut self) {
        info!("Prefilling contact details");
        self.begin_loading(2);

        let service = Arc::clone(&self.service);
        let (countries, contact) = tokio::join!(
            service.get_supported_countries(),
            service.get_domain_contact_information()
        );
        let outcome = self.apply_prefill(countries, contact).await;

        self.end_loading();
        self.end_loading();
        if let Some(change) = outcome {
            self.emit(change);
        }
    }

    async fn apply_prefill(
        &mut self,
        countries: DomregResult<Vec<Country>>,
        contact: DomregResult<DomainContactInformation>,
    ) -> Option<Change> {
        let prefill_error = || Change::PrefillError {
            message: messages::PREFILL_ERROR.into(),
        };

        match countries {
            Ok(countries) => {
                let countries = countries_to_code_names(&countries);
                debug!(count = countries.len(), "Countries loaded");
                self.countries = Some(countries);
            }
            Err(err) => {
                warn!(%err, "Could not load countries");
                return Some(prefill_error());
            }
        }

        let info = match contact {
            Ok(info) => info,
            Err(err) => {
                warn!(%err, "Could not load stored contact details");
                return Some(prefill_error());
            }
        };

        if let Some(code) = info.country_code.as_deref().filter(|c| !c.is_empty()) {
            self.fill_dial_code(code);
            if !self.fetch_states(code).await {
                return None;
            }
        }

        self.update_address_section(&info);
        self.update_phone_section(&info);
        self.update_contact_section(&info);
        info!("Contact details prefilled");
        Some(Change::PrefillSuccess)
    }

    fn update_address_section(&mut self, info: &DomainContactInformation) {
        self.set_address_text(AddressSlot::City, info.city.clone());
        self.set_address_text(AddressSlot::PostalCode, info.postal_code.clone());
        self.set_address_text(AddressSlot::Line(1), info.address_1.clone());

        if let Some(line) = info.address_2.clone().filter(|l| !l.is_empty()) {
            if self.layout.index_of(AddressSlot::Line(2)).is_none() {
                self.enable_add_address_row();
                self.replace_add_new_address_line();
            }
            self.set_address_text(AddressSlot::Line(2), Some(line));
        }

        if let Some(path) = self.address_path(AddressSlot::State) {
            let name = name_for_code(self.states.as_deref(), info.state.as_deref());
            self.set_id_value(path, info.state.clone());
            self.update_value(path, FieldValue::Text(name));
        }
    }

    fn update_phone_section(&mut self, info: &DomainContactInformation) {
        let Some((code, number)) = info.phone.as_deref().and_then(parse_phone_number) else {
            return;
        };
        for (field, text) in [(PhoneField::CountryCode, code), (PhoneField::Number, number)] {
            let path = IndexPath::new(SectionIndex::Phone, field.index());
            self.update_value(path, FieldValue::text(text));
        }
    }

    fn update_contact_section(&mut self, info: &DomainContactInformation) {
        let country = IndexPath::new(SectionIndex::ContactInformation, ContactField::Country.index());
        let name = name_for_code(self.countries.as_deref(), info.country_code.as_deref());
        self.set_id_value(country, info.country_code.clone());
        self.update_value(country, FieldValue::Text(name));

        for (field, value) in [
            (ContactField::Email, &info.email),
            (ContactField::FirstName, &info.first_name),
            (ContactField::LastName, &info.last_name),
            (ContactField::Organization, &info.organization),
        ] {
            let path = IndexPath::new(SectionIndex::ContactInformation, field.index());
            self.update_value(path, FieldValue::Text(value.clone()));
        }
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Pre-check the form remotely and, if it passes, buy the domain and
    /// make it the site's primary domain.
    ///
    /// A failed primary-domain assignment does not undo the purchase.
    #[instrument(
        skip_all,
        fields(attempt = %self.attempt, domain = %self.domain.domain_name, site_id = self.site_id)
    )]
    pub async fn register(&mut self) -> RegistrationOutcome {
        let payload = self.json_representation();
        let privacy = self.privacy_selection() == Some(PrivacyProtection::Privately);
        info!(fields = payload.len(), privacy, "Registering domain");

        self.begin_loading(1);

        // 1. Remote pre-check
        let domain_names = [self.domain.domain_name.clone()];
        let response = match self
            .service
            .validate_domain_contact_information(&payload, &domain_names)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(%err, "Remote validation failed");
                self.end_loading();
                return self.fail(messages::UNEXPECTED_ERROR);
            }
        };

        if !response.passed() {
            self.end_loading();
            warn!(
                success = response.success,
                "Remote validation rejected the contact details"
            );
            self.update_validation_errors(&response);
            self.emit(Change::RemoteValidationFinished);
            return RegistrationOutcome::Rejected;
        }
        self.clear_validation_errors();
        self.emit(Change::RemoteValidationFinished);

        // 2. Purchase
        let domain = match self
            .service
            .purchase_domain(self.site_id, &self.domain, &payload, privacy)
            .await
        {
            Ok(domain) => domain,
            Err(err) => {
                warn!(%err, "Domain purchase failed");
                self.end_loading();
                return self.fail(messages::REDEMPTION_ERROR);
            }
        };
        info!(%domain, "Domain purchased");

        // 3. Primary domain
        let primary = match self.service.set_primary_domain(self.site_id, &domain).await {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, %domain, "Could not make the domain primary; the purchase stands");
                false
            }
        };
        self.end_loading();

        self.emit(Change::RegisterSucceeded {
            domain: domain.clone(),
        });
        if primary {
            self.emit(Change::DomainIsPrimary {
                domain: domain.clone(),
            });
        }
        RegistrationOutcome::Registered { domain, primary }
    }

    fn fail(&self, message: &str) -> RegistrationOutcome {
        self.emit(Change::UnexpectedError {
            message: message.into(),
        });
        RegistrationOutcome::Failed {
            message: message.into(),
        }
    }

    /// Write the per-field server messages onto the server-side rules of
    /// the contact, phone and address sections.
    ///
    /// Fields without a message become valid. A response without a
    /// message table changes nothing. Phone messages apply to both phone
    /// rows.
    pub fn update_validation_errors(&mut self, response: &ValidationResponse) {
        if response.messages.is_none() {
            return;
        }
        let message = |key: &str| response.first_message(key).map(str::to_owned);

        let contact: Vec<_> = ContactField::ALL
            .into_iter()
            .map(|field| (field.index(), message(field.wire_key())))
            .collect();
        let phone_message = message(PhoneField::Number.wire_key());
        let phone: Vec<_> = PhoneField::ALL
            .into_iter()
            .map(|field| (field.index(), phone_message.clone()))
            .collect();
        let address: Vec<_> = self
            .layout
            .slots()
            .iter()
            .enumerate()
            .filter_map(|(row, slot)| slot.wire_key().map(|key| (row, message(key.as_str()))))
            .collect();

        self.apply_verdicts(SectionIndex::ContactInformation, contact);
        self.apply_verdicts(SectionIndex::Phone, phone);
        self.apply_verdicts(SectionIndex::Address, address);
    }

    /// Mark every server-side rule valid again.
    pub fn clear_validation_errors(&mut self) {
        for index in SectionIndex::ALL {
            let rows: Vec<_> = self
                .section(index)
                .rows()
                .iter()
                .enumerate()
                .filter(|(_, row)| row.editable().is_some())
                .map(|(row, _)| (row, None))
                .collect();
            self.apply_verdicts(index, rows);
        }
    }

    fn apply_verdicts(&mut self, index: SectionIndex, verdicts: Vec<(usize, Option<String>)>) {
        for (row, message) in verdicts {
            match self.section_mut(index).apply_server_verdict(row, message) {
                Ok(events) => self.publish(index, events),
                Err(err) => warn!(%err, "Ignoring server verdict"),
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn section_mut(&mut self, index: SectionIndex) -> &mut Section {
        &mut self.sections[index.index()]
    }

    fn address_path(&self, slot: AddressSlot) -> Option<IndexPath> {
        self.layout
            .index_of(slot)
            .map(|row| IndexPath::new(SectionIndex::Address, row))
    }

    fn set_address_text(&mut self, slot: AddressSlot, text: Option<String>) {
        match self.address_path(slot) {
            Some(path) => self.update_value(path, FieldValue::Text(text)),
            None => debug!(%slot, "Address slot not shown"),
        }
    }

    fn set_id_value(&mut self, path: IndexPath, id_value: Option<String>) {
        if let Err(err) = self.section_mut(path.section).set_id_value(path.row, id_value) {
            warn!(%err, %path, "Ignoring id value");
        }
    }

    fn clear_state_selection(&mut self) {
        if let Some(path) = self.address_path(AddressSlot::State) {
            self.set_id_value(path, None);
            self.update_value(path, FieldValue::Text(None));
        }
    }

    fn fill_dial_code(&mut self, country_code: &str) {
        match country_dial_code(country_code) {
            Some(dial_code) => {
                let path = IndexPath::new(SectionIndex::Phone, PhoneField::CountryCode.index());
                self.update_value(path, FieldValue::text(dial_code));
            }
            None => debug!(country_code, "No dial code known"),
        }
    }

    fn begin_loading(&mut self, calls: usize) {
        if let Some(change) = self.loading.begin(calls) {
            debug!(in_flight = self.loading.in_flight(), "Loading started");
            self.emit(change);
        }
    }

    fn end_loading(&mut self) {
        if let Some(change) = self.loading.end() {
            debug!("Loading finished");
            self.emit(change);
        }
    }

    /// Translate section events into changes, in order.
    fn publish(&self, section: SectionIndex, events: Vec<SectionEvent>) {
        for event in events {
            match event {
                SectionEvent::RowValidated {
                    row,
                    context,
                    is_valid,
                    message,
                } => self.emit(Change::RowValidated {
                    context,
                    index_path: IndexPath::new(section, row),
                    is_valid,
                    message,
                }),
                SectionEvent::SectionValidated { context, is_valid } => {
                    self.emit(Change::SectionValidated {
                        context,
                        section,
                        is_valid,
                    });
                    self.emit(Change::FormValidated {
                        context,
                        is_valid: self.is_valid(context),
                    });
                }
                SectionEvent::CheckMarkRowsUpdated => {
                    self.emit(Change::CheckMarkRowsUpdated { section });
                }
                SectionEvent::MultipleChoiceValueChanged { row } => {
                    self.emit(Change::MultipleChoiceRowValueChanged {
                        index_path: IndexPath::new(section, row),
                    });
                }
            }
        }
    }

    fn emit(&self, change: Change) {
        trace!(change = change.name(), "Publishing change");
        self.sink.publish(change);
    }
}

fn name_for_code(list: Option<&[CodeName]>, code: Option<&str>) -> Option<String> {
    let code = code?;
    list?
        .iter()
        .find(|entry| entry.code == code)
        .map(|entry| entry.name.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::application::{
        ApplicationError, State, ValidationMessages,
        ports::MockDomainRegistrationService,
    };
    use crate::domain::EditableKeyValueRow;

    // ========================================================================
    // Fixtures
    // ========================================================================

    type Log = Arc<Mutex<Vec<Change>>>;

    fn recorder() -> (Arc<dyn ChangeSink>, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let sink_log = Arc::clone(&log);
        let sink: Arc<dyn ChangeSink> =
            Arc::new(move |change: Change| sink_log.lock().unwrap().push(change));
        (sink, log)
    }

    fn view_model(service: MockDomainRegistrationService) -> (RegisterDomainDetailsViewModel, Log) {
        let (sink, log) = recorder();
        let vm = RegisterDomainDetailsViewModel::new(
            DomainSuggestion::new("example.blog"),
            42,
            FormOptions::default(),
            Arc::new(service),
            sink,
        );
        (vm, log)
    }

    fn take(log: &Log) -> Vec<Change> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    fn failure(operation: &'static str) -> crate::error::DomregError {
        ApplicationError::request_failed(operation, "connection reset").into()
    }

    fn contact(field: ContactField) -> IndexPath {
        IndexPath::new(SectionIndex::ContactInformation, field.index())
    }

    fn phone(field: PhoneField) -> IndexPath {
        IndexPath::new(SectionIndex::Phone, field.index())
    }

    fn address(vm: &RegisterDomainDetailsViewModel, slot: AddressSlot) -> IndexPath {
        vm.address_path(slot).unwrap()
    }

    fn editable(vm: &RegisterDomainDetailsViewModel, path: IndexPath) -> &EditableKeyValueRow {
        vm.row(path).and_then(Row::editable).unwrap()
    }

    fn fill_valid_form(vm: &mut RegisterDomainDetailsViewModel) {
        for (field, text) in [
            (ContactField::FirstName, "Ada"),
            (ContactField::LastName, "Lovelace"),
            (ContactField::Email, "ada@example.com"),
            (ContactField::Country, "United Kingdom"),
        ] {
            vm.update_value(contact(field), FieldValue::text(text));
        }
        vm.update_value(phone(PhoneField::CountryCode), FieldValue::text("44"));
        vm.update_value(phone(PhoneField::Number), FieldValue::text("07123456789"));
        for (slot, text) in [
            (AddressSlot::Line(1), "12 Engine Street"),
            (AddressSlot::City, "London"),
            (AddressSlot::PostalCode, "N1 1AA"),
        ] {
            let path = address(vm, slot);
            vm.update_value(path, FieldValue::text(text));
        }
    }

    fn prefill_service() -> MockDomainRegistrationService {
        let mut service = MockDomainRegistrationService::new();
        service.expect_get_supported_countries().returning(|| {
            Ok(vec![
                Country::new("GB", "United Kingdom"),
                Country::new("", "Atlantis"),
                Country::new("US", "United States"),
            ])
        });
        service.expect_get_domain_contact_information().returning(|| {
            Ok(DomainContactInformation {
                first_name: Some("Ada".into()),
                last_name: Some("Lovelace".into()),
                email: Some("ada@example.com".into()),
                phone: Some("+44.7123456789".into()),
                address_1: Some("12 Engine Street".into()),
                address_2: Some("Flat 3".into()),
                city: Some("London".into()),
                state: Some("LND".into()),
                postal_code: Some("N1 1AA".into()),
                country_code: Some("GB".into()),
                ..DomainContactInformation::default()
            })
        });
        service
            .expect_get_states()
            .withf(|code| code == "GB")
            .returning(|_| Ok(vec![State::new("LND", "London"), State::new("KNT", "Kent")]));
        service
    }

    // ========================================================================
    // Construction
    // ========================================================================

    #[test]
    fn new_form_is_invalid_and_silent() {
        let (vm, log) = view_model(MockDomainRegistrationService::new());
        assert!(take(&log).is_empty());
        assert!(!vm.is_valid(ValidationContext::ClientSide));
        assert!(vm.is_valid(ValidationContext::ServerSide));
        assert_eq!(vm.privacy_selection(), Some(PrivacyProtection::Privately));
        assert!(!vm.is_loading());
    }

    // ========================================================================
    // Exclusive selection
    // ========================================================================

    #[test]
    fn privacy_selection_is_exclusive_and_reselect_is_silent() {
        let (mut vm, log) = view_model(MockDomainRegistrationService::new());
        let private = IndexPath::new(SectionIndex::PrivacyProtection, 0);
        let public = IndexPath::new(SectionIndex::PrivacyProtection, 1);

        vm.update_value(private, FieldValue::Selected(true));
        assert!(take(&log).is_empty());

        vm.update_value(public, FieldValue::Selected(true));
        assert_eq!(
            take(&log),
            vec![Change::CheckMarkRowsUpdated {
                section: SectionIndex::PrivacyProtection
            }]
        );
        assert_eq!(vm.privacy_selection(), Some(PrivacyProtection::Publicly));
        assert_eq!(vm.json_representation()["privacy_protection"], "1");

        vm.update_value(public, FieldValue::Selected(true));
        assert!(take(&log).is_empty());
    }

    #[test]
    fn bad_paths_are_ignored() {
        let (mut vm, log) = view_model(MockDomainRegistrationService::new());
        vm.update_value(
            IndexPath::new(SectionIndex::ContactInformation, 99),
            FieldValue::text("x"),
        );
        vm.update_value(contact(ContactField::Email), FieldValue::Selected(true));
        assert!(take(&log).is_empty());
    }

    // ========================================================================
    // Aggregate AND law
    // ========================================================================

    #[test]
    fn form_validated_follows_every_section_flip() {
        let (mut vm, log) = view_model(MockDomainRegistrationService::new());
        fill_valid_form(&mut vm);
        assert!(vm.is_valid(ValidationContext::ClientSide));

        let changes = take(&log);
        let last_form = changes
            .iter()
            .rev()
            .find(|c| matches!(c, Change::FormValidated { .. }));
        assert_eq!(
            last_form,
            Some(&Change::FormValidated {
                context: ValidationContext::ClientSide,
                is_valid: true
            })
        );
        for (i, change) in changes.iter().enumerate() {
            if let Change::SectionValidated { context, .. } = change {
                assert!(matches!(
                    changes.get(i + 1),
                    Some(Change::FormValidated { context: c, .. }) if c == context
                ));
            }
        }

        vm.update_value(contact(ContactField::Email), FieldValue::text(""));
        let changes = take(&log);
        assert_eq!(
            changes,
            vec![
                Change::RowValidated {
                    context: ValidationContext::ClientSide,
                    index_path: contact(ContactField::Email),
                    is_valid: false,
                    message: Some("Please enter an email address".into()),
                },
                Change::SectionValidated {
                    context: ValidationContext::ClientSide,
                    section: SectionIndex::ContactInformation,
                    is_valid: false,
                },
                Change::FormValidated {
                    context: ValidationContext::ClientSide,
                    is_valid: false,
                },
            ]
        );
    }

    // ========================================================================
    // Address lines
    // ========================================================================

    #[test]
    fn extra_address_lines_stop_at_five() {
        let (mut vm, log) = view_model(MockDomainRegistrationService::new());
        vm.enable_add_address_row();
        assert_eq!(
            take(&log),
            vec![Change::AddNewAddressLineEnabled {
                index_path: IndexPath::new(SectionIndex::Address, 1)
            }]
        );

        for n in 0..5 {
            let at = 1 + n;
            vm.replace_add_new_address_line();
            let mut expected = vec![Change::AddNewAddressLineReplaced {
                index_path: IndexPath::new(SectionIndex::Address, at),
            }];
            if n < 4 {
                expected.push(Change::AddNewAddressLineEnabled {
                    index_path: IndexPath::new(SectionIndex::Address, at + 1),
                });
            }
            assert_eq!(take(&log), expected, "line {}", n + 2);
        }

        assert!(!vm.address_layout().is_placeholder_visible());
        vm.enable_add_address_row();
        assert!(take(&log).is_empty());
        assert_eq!(vm.address_layout().extra_line_count(), 5);
        assert_eq!(vm.section(SectionIndex::Address).len(), 9);
        assert_eq!(editable(&vm, address(&vm, AddressSlot::Line(6))).wire_key(), "address_6");
    }

    #[test]
    fn promotion_shows_a_fresh_placeholder() {
        let (mut vm, log) = view_model(MockDomainRegistrationService::new());
        vm.enable_add_address_row();
        vm.replace_add_new_address_line();

        assert!(vm.address_layout().is_placeholder_visible());
        assert_eq!(
            take(&log),
            vec![
                Change::AddNewAddressLineEnabled {
                    index_path: IndexPath::new(SectionIndex::Address, 1)
                },
                Change::AddNewAddressLineReplaced {
                    index_path: IndexPath::new(SectionIndex::Address, 1)
                },
                Change::AddNewAddressLineEnabled {
                    index_path: IndexPath::new(SectionIndex::Address, 2)
                },
            ]
        );
        let placeholder = vm.row(IndexPath::new(SectionIndex::Address, 2));
        assert!(matches!(placeholder, Some(Row::AddAddressLine { title }) if title == "+ Address line 3"));
        assert_eq!(vm.section(SectionIndex::Address).len(), 6);
        assert!(!vm.json_representation().contains_key("address_3"));
    }

    #[test]
    fn placeholder_is_shown_once() {
        let (mut vm, log) = view_model(MockDomainRegistrationService::new());
        vm.enable_add_address_row();
        vm.enable_add_address_row();
        assert_eq!(take(&log).len(), 1);

        let placeholder = vm.row(IndexPath::new(SectionIndex::Address, 1));
        assert!(matches!(placeholder, Some(Row::AddAddressLine { title }) if title == "+ Address line 2"));
        assert_eq!(vm.index_path_for_key("city"), Some(IndexPath::new(SectionIndex::Address, 2)));
    }

    #[test]
    fn replace_without_placeholder_is_a_no_op() {
        let (mut vm, log) = view_model(MockDomainRegistrationService::new());
        vm.replace_add_new_address_line();
        assert!(take(&log).is_empty());
        assert_eq!(vm.section(SectionIndex::Address).len(), 4);
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    #[test]
    fn phone_is_normalized_into_one_field() {
        let (mut vm, _log) = view_model(MockDomainRegistrationService::new());
        vm.update_value(phone(PhoneField::CountryCode), FieldValue::text("44"));
        vm.update_value(phone(PhoneField::Number), FieldValue::text("07123456789"));

        let payload = vm.json_representation();
        assert_eq!(payload["phone"], "+44.7123456789");
        assert!(!payload.contains_key("phone_country_code"));
    }

    #[test]
    fn payload_is_deterministic_and_skips_empty_rows() {
        let (mut vm, _log) = view_model(MockDomainRegistrationService::new());
        fill_valid_form(&mut vm);

        let first = vm.json_representation();
        assert_eq!(first, vm.json_representation());
        assert_eq!(first["privacy_protection"], "0");
        assert_eq!(first["first_name"], "Ada");
        assert_eq!(first["country_code"], "United Kingdom");
        assert_eq!(first["address_1"], "12 Engine Street");
        assert!(!first.contains_key("organization"));
        assert!(!first.contains_key("state"));
    }

    #[test]
    fn lookups_find_rows_and_errors() {
        let (vm, _log) = view_model(MockDomainRegistrationService::new());
        assert_eq!(vm.index_path_for_key("email"), Some(contact(ContactField::Email)));
        assert_eq!(vm.index_path_for_key("phone"), Some(phone(PhoneField::Number)));
        assert_eq!(vm.index_path_for_key("privacy_protection"), None);

        let errors = vm.validation_errors(ValidationContext::ClientSide);
        assert!(errors.contains(&(
            contact(ContactField::FirstName),
            "Please enter a first name".to_string()
        )));
        assert!(vm.validation_errors(ValidationContext::ServerSide).is_empty());
    }

    // ========================================================================
    // Prefill
    // ========================================================================

    #[tokio::test]
    async fn prefill_fills_every_section() {
        let (mut vm, log) = view_model(prefill_service());
        vm.prefill().await;

        assert_eq!(vm.country_names(), vec!["United Kingdom", "United States"]);
        assert_eq!(vm.state_names(), vec!["London", "Kent"]);

        let country = editable(&vm, contact(ContactField::Country));
        assert_eq!(country.value(), Some("United Kingdom"));
        assert_eq!(country.wire_value(), Some("GB"));

        assert_eq!(editable(&vm, phone(PhoneField::CountryCode)).value(), Some("44"));
        assert_eq!(editable(&vm, phone(PhoneField::Number)).value(), Some("7123456789"));

        let state = editable(&vm, address(&vm, AddressSlot::State));
        assert_eq!(state.value(), Some("London"));
        assert_eq!(state.wire_value(), Some("LND"));

        assert_eq!(vm.address_layout().extra_line_count(), 1);
        let line2 = editable(&vm, address(&vm, AddressSlot::Line(2)));
        assert_eq!(line2.value(), Some("Flat 3"));

        assert!(vm.is_valid(ValidationContext::ClientSide));
        let payload = vm.json_representation();
        assert_eq!(payload["phone"], "+44.7123456789");
        assert_eq!(payload["state"], "LND");
        assert_eq!(payload["address_2"], "Flat 3");

        let changes = take(&log);
        let loading: Vec<_> = changes
            .iter()
            .filter(|c| matches!(c, Change::Loading(_)))
            .collect();
        assert_eq!(loading, vec![&Change::Loading(true), &Change::Loading(false)]);
        assert_eq!(changes.first(), Some(&Change::Loading(true)));
        assert_eq!(changes.last(), Some(&Change::PrefillSuccess));
        assert!(!vm.is_loading());
    }

    #[tokio::test]
    async fn prefill_without_countries_reports_prefill_error() {
        let mut service = MockDomainRegistrationService::new();
        service
            .expect_get_supported_countries()
            .returning(|| Err(failure("get_supported_countries")));
        service
            .expect_get_domain_contact_information()
            .returning(|| Ok(DomainContactInformation::default()));
        let (mut vm, log) = view_model(service);

        vm.prefill().await;

        assert_eq!(
            take(&log),
            vec![
                Change::Loading(true),
                Change::Loading(false),
                Change::PrefillError {
                    message: messages::PREFILL_ERROR.into()
                },
            ]
        );
        assert!(vm.countries().is_empty());
    }

    #[tokio::test]
    async fn prefill_states_failure_is_an_unexpected_error() {
        let mut service = MockDomainRegistrationService::new();
        service
            .expect_get_supported_countries()
            .returning(|| Ok(vec![Country::new("US", "United States")]));
        service.expect_get_domain_contact_information().returning(|| {
            Ok(DomainContactInformation {
                first_name: Some("Grace".into()),
                country_code: Some("US".into()),
                ..DomainContactInformation::default()
            })
        });
        service
            .expect_get_states()
            .returning(|_| Err(failure("get_states")));
        let (mut vm, log) = view_model(service);

        vm.prefill().await;

        let changes = take(&log);
        assert!(changes.contains(&Change::UnexpectedError {
            message: messages::STATES_FETCH_ERROR.into()
        }));
        assert!(!changes.contains(&Change::PrefillSuccess));
        assert_eq!(editable(&vm, contact(ContactField::FirstName)).value(), None);
        assert_eq!(changes.last(), Some(&Change::Loading(false)));
    }

    // ========================================================================
    // Pickers
    // ========================================================================

    #[tokio::test]
    async fn selecting_a_country_reloads_states_and_clears_the_state() {
        let mut service = prefill_service();
        service
            .expect_get_states()
            .withf(|code| code == "US")
            .returning(|_| Ok(vec![State::new("OH", "Ohio")]));
        let (mut vm, log) = view_model(service);
        vm.prefill().await;
        take(&log);

        vm.select_country(1).await;

        let country = editable(&vm, contact(ContactField::Country));
        assert_eq!(country.value(), Some("United States"));
        assert_eq!(country.wire_value(), Some("US"));
        assert_eq!(editable(&vm, phone(PhoneField::CountryCode)).value(), Some("1"));
        assert_eq!(vm.state_names(), vec!["Ohio"]);
        assert_eq!(editable(&vm, address(&vm, AddressSlot::State)).wire_value(), None);

        let changes = take(&log);
        assert!(changes.contains(&Change::MultipleChoiceRowValueChanged {
            index_path: contact(ContactField::Country)
        }));
        assert_eq!(changes.last(), Some(&Change::PrefillSuccess));

        vm.select_state(0);
        assert_eq!(vm.json_representation()["state"], "OH");
    }

    #[tokio::test]
    async fn out_of_range_picks_are_ignored() {
        let (mut vm, log) = view_model(MockDomainRegistrationService::new());
        vm.select_country(3).await;
        vm.select_state(0);
        assert!(take(&log).is_empty());
    }

    // ========================================================================
    // Registration
    // ========================================================================

    fn email_rejected() -> ValidationResponse {
        let mut messages = ValidationMessages::new();
        messages.insert("email".into(), vec!["Invalid email".into()]);
        ValidationResponse::rejected(messages)
    }

    #[tokio::test]
    async fn server_errors_round_trip_onto_rules() {
        let mut service = MockDomainRegistrationService::new();
        let mut responses = vec![ValidationResponse::accepted(), email_rejected()];
        service
            .expect_validate_domain_contact_information()
            .withf(|_, names| names == ["example.blog".to_string()])
            .times(2)
            .returning(move |_, _| Ok(responses.pop().unwrap_or_default()));
        service
            .expect_purchase_domain()
            .returning(|_, domain, _, _| Ok(domain.domain_name.clone()));
        service.expect_set_primary_domain().returning(|_, _| Ok(()));
        let (mut vm, log) = view_model(service);
        fill_valid_form(&mut vm);
        take(&log);

        assert_eq!(vm.register().await, RegistrationOutcome::Rejected);
        let email = editable(&vm, contact(ContactField::Email));
        let rule = email.first_rule(ValidationContext::ServerSide).unwrap();
        assert!(!rule.is_valid());
        assert_eq!(rule.server_error_message(), Some("Invalid email"));
        assert!(!vm.is_valid(ValidationContext::ServerSide));
        assert_eq!(
            vm.validation_errors(ValidationContext::ServerSide),
            vec![(contact(ContactField::Email), "Invalid email".to_string())]
        );
        let changes = take(&log);
        assert_eq!(changes.last(), Some(&Change::RemoteValidationFinished));

        let outcome = vm.register().await;
        assert_eq!(
            outcome,
            RegistrationOutcome::Registered {
                domain: "example.blog".into(),
                primary: true
            }
        );
        let rule = editable(&vm, contact(ContactField::Email))
            .first_rule(ValidationContext::ServerSide)
            .unwrap();
        assert!(rule.is_valid());
        assert!(vm.is_valid(ValidationContext::ServerSide));

        let changes = take(&log);
        assert!(changes.contains(&Change::RemoteValidationFinished));
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

    #[test]
    fn phone_message_marks_both_phone_rows() {
        let (mut vm, _log) = view_model(MockDomainRegistrationService::new());
        let mut messages = ValidationMessages::new();
        messages.insert("phone".into(), vec!["Invalid phone".into()]);
        vm.update_validation_errors(&ValidationResponse::rejected(messages));

        for field in PhoneField::ALL {
            assert_eq!(
                editable(&vm, phone(field)).validation_errors(ValidationContext::ServerSide),
                vec!["Invalid phone"]
            );
        }
        assert!(vm.section(SectionIndex::ContactInformation).is_valid(ValidationContext::ServerSide));

        vm.clear_validation_errors();
        assert!(vm.is_valid(ValidationContext::ServerSide));
    }

    #[tokio::test]
    async fn purchase_failure_is_reported() {
        let mut service = MockDomainRegistrationService::new();
        service
            .expect_validate_domain_contact_information()
            .returning(|_, _| Ok(ValidationResponse::accepted()));
        service
            .expect_purchase_domain()
            .withf(|site, _, payload, privacy| {
                *site == 42 && *privacy && payload.get("phone").is_some()
            })
            .returning(|_, _, _, _| Err(failure("purchase_domain")));
        service.expect_set_primary_domain().never();
        let (mut vm, log) = view_model(service);
        fill_valid_form(&mut vm);
        take(&log);

        let outcome = vm.register().await;
        assert_eq!(
            outcome,
            RegistrationOutcome::Failed {
                message: messages::REDEMPTION_ERROR.into()
            }
        );
        assert_eq!(
            take(&log).last(),
            Some(&Change::UnexpectedError {
                message: messages::REDEMPTION_ERROR.into()
            })
        );
        assert!(!vm.is_loading());
    }

    #[tokio::test]
    async fn primary_domain_failure_keeps_the_purchase() {
        let mut service = MockDomainRegistrationService::new();
        service
            .expect_validate_domain_contact_information()
            .returning(|_, _| Ok(ValidationResponse::accepted()));
        service
            .expect_purchase_domain()
            .returning(|_, _, _, _| Ok("example.blog".into()));
        service
            .expect_set_primary_domain()
            .withf(|site, domain| *site == 42 && domain == "example.blog")
            .returning(|_, _| Err(failure("set_primary_domain")));
        let (mut vm, log) = view_model(service);

        let outcome = vm.register().await;
        assert_eq!(
            outcome,
            RegistrationOutcome::Registered {
                domain: "example.blog".into(),
                primary: false
            }
        );
        let changes = take(&log);
        assert!(changes.contains(&Change::RegisterSucceeded {
            domain: "example.blog".into()
        }));
        assert!(!changes.iter().any(|c| matches!(c, Change::DomainIsPrimary { .. })));
    }

    #[tokio::test]
    async fn validation_transport_error_is_unexpected() {
        let mut service = MockDomainRegistrationService::new();
        service
            .expect_validate_domain_contact_information()
            .returning(|_, _| Err(failure("validate_domain_contact_information")));
        service.expect_purchase_domain().never();
        let (mut vm, log) = view_model(service);

        let outcome = vm.register().await;
        assert!(matches!(outcome, RegistrationOutcome::Failed { .. }));
        assert_eq!(
            take(&log),
            vec![
                Change::Loading(true),
                Change::Loading(false),
                Change::UnexpectedError {
                    message: messages::UNEXPECTED_ERROR.into()
                },
            ]
        );
    }
}
