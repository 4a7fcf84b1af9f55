//! `domreg config` reads and writes configuration values.

use std::path::Path;

use tracing::debug;

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::{AppConfig, KNOWN_KEYS},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = get_config_value(&config, &key)?;
            output.print(&format!("{key} = {value:?}"))?;
        }

        ConfigCommands::Set { key, value } => {
            let path = AppConfig::config_path(global.config.as_deref());
            set_config_value(&path, &key, &value)?;
            output.success(&format!("Set {key} = {value} in {}", path.display()))?;
        }

        ConfigCommands::List => {
            output.header("Current Configuration:")?;
            let serialised = toml::to_string_pretty(&config)
                .with_cli_context(|| "Failed to serialise config")?;
            output.print(&serialised)?;
        }

        ConfigCommands::Path => {
            let path = AppConfig::config_path(global.config.as_deref());
            output.print(&path.display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn get_config_value(config: &AppConfig, key: &str) -> CliResult<String> {
    config.get(key).ok_or_else(|| unknown_key(key))
}

fn unknown_key(key: &str) -> CliError {
    CliError::config(format!(
        "Unknown config key: '{key}' (known: {})",
        KNOWN_KEYS.join(", ")
    ))
}

/// Write `key = value` into the file at `path`, keeping its other entries.
///
/// The result must still deserialise into an [`AppConfig`]; nothing is
/// written otherwise.
fn set_config_value(path: &Path, key: &str, raw: &str) -> CliResult<()> {
    if !KNOWN_KEYS.contains(&key) {
        return Err(unknown_key(key));
    }
    let Some((table_name, field)) = key.split_once('.') else {
        return Err(unknown_key(key));
    };

    let mut document: toml::Table = if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_cli_context(|| format!("Failed to read config '{}'", path.display()))?;
        toml::from_str(&text)
            .with_cli_context(|| format!("Config '{}' is not valid TOML", path.display()))?
    } else {
        toml::Table::new()
    };

    let table = document
        .entry(table_name)
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    let Some(table) = table.as_table_mut() else {
        return Err(CliError::config(format!(
            "'{table_name}' in '{}' is not a table",
            path.display()
        )));
    };
    table.insert(field.to_owned(), typed_value(raw));

    toml::Value::Table(document.clone())
        .try_into::<AppConfig>()
        .map_err(|e| CliError::ConfigError {
            message: format!("Invalid value for {key}: '{raw}'"),
            source: Some(Box::new(e)),
        })?;

    let text = toml::to_string_pretty(&document)
        .with_cli_context(|| "Failed to serialise config")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }
    std::fs::write(path, text)
        .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))?;
    debug!(key, path = %path.display(), "Config value written");
    Ok(())
}

fn typed_value(raw: &str) -> toml::Value {
    if let Ok(flag) = raw.parse::<bool>() {
        toml::Value::Boolean(flag)
    } else if let Ok(number) = raw.parse::<i64>() {
        toml::Value::Integer(number)
    } else {
        toml::Value::String(raw.to_owned())
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
