//! `domreg countries` lists what the registration service supports.

use tracing::instrument;

use domreg_core::{
    application::{
        DomainRegistrationService,
        dto::{countries_to_code_names, states_to_code_names},
    },
    domain::CodeName,
};

use crate::{
    cli::{CountriesArgs, GlobalArgs, OutputFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: CountriesArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let service = super::open_service(args.fixture.as_deref(), &config)?;
    let entries = super::runtime()?.block_on(fetch(&service, args.states.as_deref()))?;

    match args.states {
        Some(code) if entries.is_empty() && !output.is_json() => {
            output.info(&format!("No states are listed for {}", code.to_uppercase()))?;
            Ok(())
        }
        Some(code) => render(&entries, &format!("States of {}", code.to_uppercase()), &output),
        None => render(&entries, "Supported countries", &output),
    }
}

#[instrument(skip(service))]
async fn fetch(
    service: &dyn DomainRegistrationService,
    states_of: Option<&str>,
) -> CliResult<Vec<CodeName>> {
    Ok(match states_of {
        Some(code) => states_to_code_names(&service.get_states(code).await?),
        None => countries_to_code_names(&service.get_supported_countries().await?),
    })
}

fn render(entries: &[CodeName], title: &str, output: &OutputManager) -> CliResult<()> {
    match output.format() {
        OutputFormat::Json => output.json(entries)?,
        OutputFormat::Plain => {
            for entry in entries {
                output.print(&format!("{}\t{}", entry.code, entry.name))?;
            }
        }
        _ => {
            output.header(&format!("{title} ({})", entries.len()))?;
            let width = entries.iter().map(|e| e.code.len()).max().unwrap_or(0);
            for entry in entries {
                output.print(&format!("  {:<width$}  {}", entry.code, entry.name))?;
            }
        }
    }
    Ok(())
}
