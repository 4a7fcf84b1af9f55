//! Implementation of the `domreg register` command.
//!
//! Translates flags into form edits, shows the result, and drives the
//! view model through pre-check and purchase. Form rules stay in the core.

use std::io::IsTerminal as _;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use domreg_adapters::{InMemoryDomainService, RecordingSink};
use domreg_core::{
    application::{Change, DomainSuggestion, RegisterDomainDetailsViewModel, RegistrationOutcome},
    domain::{
        AddressSlot, CodeName, ContactField, FieldValue, IndexPath, PrivacyProtection, Row,
        SectionIndex, ValidationContext,
    },
};

use crate::{
    cli::{GlobalArgs, RegisterArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute `domreg register`.
///
/// 1. Prefill from the account
/// 2. Apply `--country`, `--state`, `--public`, `--address-line`, `--set`
/// 3. Prompt for missing required fields (interactive builds on a TTY)
/// 4. Refuse if the client-side checks fail
/// 5. `--dry-run` prints the payload; otherwise confirm and register
pub fn execute(
    args: RegisterArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = super::open_service(args.fixture.as_deref(), &config)?;
    super::runtime()?.block_on(register(args, global, config, output, service))
}

#[instrument(skip_all, fields(domain = %args.domain, site_id = args.site_id))]
async fn register(
    args: RegisterArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
    service: InMemoryDomainService,
) -> CliResult<()> {
    let sink = RecordingSink::new();
    let mut form = RegisterDomainDetailsViewModel::new(
        DomainSuggestion::new(args.domain.clone()),
        args.site_id,
        config.form_options(),
        Arc::new(service),
        Arc::new(sink.clone()),
    );

    // 1. Prefill
    let spinner = output.spinner("Loading saved contact details...");
    form.prefill().await;
    spinner.finish_and_clear();
    report_notices(&sink.take(), &output)?;

    // 2. Overrides
    apply_overrides(&mut form, &args).await?;
    report_notices(&sink.take(), &output)?;

    // 3. Prompts
    if prompts_allowed(&args, &global, &output) {
        prompt::fill_missing(&mut form).await?;
        report_notices(&sink.take(), &output)?;
    }

    // 4. Client-side checks
    if !output.is_json() {
        print_summary(&form, &output)?;
    }
    let errors = field_errors(&form, ValidationContext::ClientSide);
    if !errors.is_empty() {
        return Err(CliError::FormIncomplete { errors });
    }

    // 5. Dry run or register
    if args.dry_run {
        output.json(&form.json_representation())?;
        return Ok(());
    }

    if !args.yes && !global.quiet && !output.is_json() && !prompt::confirm(&args.domain)? {
        return Err(CliError::Cancelled);
    }

    let spinner = output.spinner(&format!("Registering {}...", args.domain));
    let outcome = form.register().await;
    spinner.finish_and_clear();
    let changes = sink.take();
    debug!(changes = changes.len(), "Registration finished");

    match outcome {
        RegistrationOutcome::Registered { domain, primary } => {
            info!(%domain, primary, "Domain registered");
            if output.is_json() {
                output.json(&RegisterReport {
                    domain: &domain,
                    site_id: args.site_id,
                    primary,
                    attempt: form.attempt_id().to_string(),
                    changes: &changes,
                })?;
                return Ok(());
            }
            output.success(&format!("{domain} is registered for site {}", args.site_id))?;
            if primary {
                output.info(&format!("{domain} is now the site's primary domain"))?;
            } else {
                output.warning(&format!(
                    "{domain} could not be made the primary domain; set it from the site settings"
                ))?;
            }
            Ok(())
        }
        RegistrationOutcome::Rejected => Err(CliError::Rejected {
            errors: field_errors(&form, ValidationContext::ServerSide),
        }),
        RegistrationOutcome::Failed { message } => Err(CliError::RegistrationFailed { message }),
    }
}

#[derive(Serialize)]
struct RegisterReport<'a> {
    domain: &'a str,
    site_id: u64,
    primary: bool,
    attempt: String,
    changes: &'a [Change],
}

// ── Overrides ─────────────────────────────────────────────────────────────────

async fn apply_overrides(
    form: &mut RegisterDomainDetailsViewModel,
    args: &RegisterArgs,
) -> CliResult<()> {
    if args.public {
        let path = IndexPath::new(
            SectionIndex::PrivacyProtection,
            PrivacyProtection::Publicly.index(),
        );
        form.update_value(path, FieldValue::Selected(true));
    }

    // Picker fields go through the loaded lists, even when given with --set.
    let mut country = args.country.clone();
    let mut state = args.state.clone();
    let mut fields = Vec::new();
    for (key, value) in &args.set {
        match key.as_str() {
            key if key == ContactField::Country.wire_key() => country = Some(value.clone()),
            "state" => state = Some(value.clone()),
            _ => fields.push((key, value)),
        }
    }

    if let Some(query) = country {
        let index = find_choice(form.countries(), &query).ok_or(CliError::UnknownChoice {
            kind: "country",
            query,
        })?;
        form.select_country(index).await;
    }
    if let Some(query) = state {
        let index = find_choice(form.states(), &query).ok_or(CliError::UnknownChoice {
            kind: "state",
            query,
        })?;
        form.select_state(index);
    }

    for (offset, text) in args.address_lines.iter().enumerate() {
        let slot = AddressSlot::Line(offset + 2);
        if form.address_layout().index_of(slot).is_none() {
            form.enable_add_address_row();
            form.replace_add_new_address_line();
        }
        let Some(row) = form.address_layout().index_of(slot) else {
            return Err(CliError::InvalidInput {
                message: format!(
                    "at most {} extra address line(s) are allowed",
                    form.address_layout().max_extra_lines()
                ),
                source: None,
            });
        };
        form.update_value(IndexPath::new(SectionIndex::Address, row), FieldValue::text(text));
    }

    for (key, value) in fields {
        let path = form
            .index_path_for_key(key)
            .ok_or_else(|| CliError::UnknownField {
                key: key.clone(),
                known: settable_keys(form),
            })?;
        let value = (!value.is_empty()).then(|| value.clone());
        form.update_value(path, FieldValue::Text(value));
    }
    Ok(())
}

/// Index of the entry whose code or name matches `query`, ignoring case.
fn find_choice(choices: &[CodeName], query: &str) -> Option<usize> {
    let query = query.trim();
    choices
        .iter()
        .position(|c| c.code.eq_ignore_ascii_case(query) || c.name.eq_ignore_ascii_case(query))
}

fn settable_keys(form: &RegisterDomainDetailsViewModel) -> Vec<String> {
    form.sections()
        .iter()
        .flat_map(|section| section.rows())
        .filter_map(Row::editable)
        .map(|row| row.wire_key().to_owned())
        .collect()
}

// ── Reporting ─────────────────────────────────────────────────────────────────

/// Failing rules of `context` as `(wire key, message)`.
fn field_errors(
    form: &RegisterDomainDetailsViewModel,
    context: ValidationContext,
) -> Vec<(String, String)> {
    form.validation_errors(context)
        .into_iter()
        .map(|(path, message)| {
            let key = form
                .row(path)
                .and_then(Row::editable)
                .map(|row| row.wire_key().to_owned())
                .unwrap_or_else(|| path.to_string());
            (key, message)
        })
        .collect()
}

fn report_notices(changes: &[Change], output: &OutputManager) -> CliResult<()> {
    for change in changes {
        if let Change::PrefillError { message } | Change::UnexpectedError { message } = change {
            output.warning(message)?;
        }
    }
    Ok(())
}

fn print_summary(form: &RegisterDomainDetailsViewModel, output: &OutputManager) -> CliResult<()> {
    output.header(&format!(
        "Registering {} for site {}",
        form.domain().domain_name,
        form.site_id()
    ))?;

    for section in form.sections() {
        output.print("")?;
        output.print(&capitalize(section.index().as_str()))?;
        for row in section.rows() {
            match row {
                Row::CheckMark(check) => {
                    let mark = if check.is_selected { "(x)" } else { "( )" };
                    output.print(&format!("  {mark} {}", check.title))?;
                }
                Row::InlineEditable(field) => {
                    let valid = field.is_valid(ValidationContext::ClientSide);
                    let mark = if valid { "\u{2713}" } else { "\u{2717}" };
                    let value = field.value().filter(|v| !v.is_empty()).unwrap_or("-");
                    output.print(&format!("  {mark} {:<14} {value}", field.label()))?;
                    for message in field.validation_errors(ValidationContext::ClientSide) {
                        output.detail(&format!("      {message}"))?;
                    }
                }
                Row::AddAddressLine { .. } => {}
            }
        }
    }
    output.print("")?;
    Ok(())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn prompts_allowed(args: &RegisterArgs, global: &GlobalArgs, output: &OutputManager) -> bool {
    cfg!(feature = "interactive")
        && !args.yes
        && !global.quiet
        && !output.is_json()
        && std::io::stdin().is_terminal()
        && std::io::stdout().is_terminal()
}

// ── Prompts ───────────────────────────────────────────────────────────────────

#[cfg(feature = "interactive")]
mod prompt {
    use dialoguer::{Confirm, FuzzySelect, Input, theme::ColorfulTheme};

    use domreg_core::application::RegisterDomainDetailsViewModel;
    use domreg_core::domain::{
        ContactField, FieldValue, IndexPath, Row, SectionIndex, ValidationContext,
    };

    use crate::error::{CliError, CliResult};

    fn prompt_failed(err: dialoguer::Error) -> CliError {
        CliError::InvalidInput {
            message: format!("prompt failed: {err}"),
            source: Some(Box::new(err)),
        }
    }

    /// Ask for every field whose client-side check fails.
    pub async fn fill_missing(form: &mut RegisterDomainDetailsViewModel) -> CliResult<()> {
        let theme = ColorfulTheme::default();
        let country = IndexPath::new(SectionIndex::ContactInformation, ContactField::Country.index());
        let missing: Vec<IndexPath> = form
            .validation_errors(ValidationContext::ClientSide)
            .into_iter()
            .map(|(path, _)| path)
            .collect();

        for path in missing {
            // An earlier answer (a country fills the dial code) may have fixed it.
            let Some(row) = form.row(path).and_then(Row::editable) else {
                continue;
            };
            if row.is_valid(ValidationContext::ClientSide) {
                continue;
            }
            let label = row.label().to_owned();

            if path == country && !form.countries().is_empty() {
                let names: Vec<String> = form.country_names().into_iter().map(str::to_owned).collect();
                let index = FuzzySelect::with_theme(&theme)
                    .with_prompt(&label)
                    .items(&names)
                    .default(0)
                    .interact()
                    .map_err(prompt_failed)?;
                form.select_country(index).await;
                continue;
            }

            let text: String = Input::with_theme(&theme)
                .with_prompt(&label)
                .interact_text()
                .map_err(prompt_failed)?;
            form.update_value(path, FieldValue::text(text));
        }
        Ok(())
    }

    pub fn confirm(domain: &str) -> CliResult<bool> {
        if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
            return Err(CliError::InvalidInput {
                message: "cannot ask for confirmation without a terminal; pass --yes".into(),
                source: None,
            });
        }
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Register {domain}?"))
            .default(true)
            .interact()
            .map_err(prompt_failed)
    }
}

#[cfg(not(feature = "interactive"))]
mod prompt {
    use std::io::{self, Write};

    use domreg_core::application::RegisterDomainDetailsViewModel;

    use crate::error::{CliError, CliResult};

    pub async fn fill_missing(_form: &mut RegisterDomainDetailsViewModel) -> CliResult<()> {
        Ok(())
    }

    pub fn confirm(domain: &str) -> CliResult<bool> {
        print!("Register {domain}? [Y/n] ");
        io::stdout().flush().map_err(|e| CliError::IoError {
            message: "failed to flush stdout".into(),
            source: e,
        })?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .map_err(|e| CliError::IoError {
                message: "failed to read confirmation input".into(),
                source: e,
            })?;

        let input = input.trim().to_ascii_lowercase();
        Ok(input.is_empty() || input == "y" || input == "yes")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
