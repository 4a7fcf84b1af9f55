//! Command handlers, one module per subcommand.

use std::path::Path;

use tracing::debug;

use domreg_adapters::InMemoryDomainService;

use crate::{
    config::AppConfig,
    error::{CliResult, IntoCli},
};

pub mod completions;
pub mod config;
pub mod countries;
pub mod init;
pub mod register;

/// Single-threaded runtime for the service calls of one command.
pub(crate) fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .with_cli_context(|| "Failed to start the async runtime")
}

/// Registration service backing a command: `--fixture`, else
/// `service.fixture`, else the built-in demo data.
pub(crate) fn open_service(
    fixture: Option<&Path>,
    config: &AppConfig,
) -> CliResult<InMemoryDomainService> {
    match fixture.or(config.service.fixture.as_deref()) {
        Some(path) => {
            debug!(path = %path.display(), "Loading service fixture");
            Ok(InMemoryDomainService::from_path(path)?)
        }
        None => Ok(InMemoryDomainService::builtin()),
    }
}
