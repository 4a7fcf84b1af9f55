//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! core crate only ever sees the [`FormOptions`] derived from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `DOMREG_*` environment variables, `__` between nesting levels
//!    (`DOMREG_FORM__DEFAULT_PRIVACY=public`)
//! 3. The file given with `--config`, otherwise `.domreg.toml` in the
//!    current directory layered over the global file
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use domreg_core::domain::{FormOptions, PrivacyProtection};

pub const LOCAL_CONFIG_FILE: &str = ".domreg.toml";
const ENV_PREFIX: &str = "DOMREG";

/// Every key `config get`/`config set` understands.
pub const KNOWN_KEYS: [&str; 5] = [
    "service.fixture",
    "form.max_extra_address_lines",
    "form.default_privacy",
    "output.no_color",
    "output.format",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub form: FormConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Fixture backing the registration service. The built-in demo data
    /// is used when unset.
    pub fixture: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub max_extra_address_lines: usize,
    pub default_privacy: PrivacyProtection,
}

impl Default for FormConfig {
    fn default() -> Self {
        let options = FormOptions::default();
        Self {
            max_extra_address_lines: options.max_extra_address_lines,
            default_privacy: options.default_privacy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, files and the environment.
    ///
    /// An explicit `config_file` must exist; the default locations are
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to build default configuration")?;
        let mut builder = Config::builder().add_source(defaults);

        match config_file {
            Some(path) => {
                debug!(path = %path.display(), "Using explicit config file");
                builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml));
            }
            None => {
                for path in [Self::global_config_path(), PathBuf::from(LOCAL_CONFIG_FILE)] {
                    builder = builder.add_source(
                        File::new(&path.to_string_lossy(), FileFormat::Toml).required(false),
                    );
                }
            }
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn form_options(&self) -> FormOptions {
        FormOptions {
            max_extra_address_lines: self.form.max_extra_address_lines,
            default_privacy: self.form.default_privacy,
        }
    }

    /// Platform config file, falling back to `.domreg.toml` in the current
    /// directory when no home directory can be resolved.
    pub fn global_config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "domreg", "domreg")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// The file `config set` writes to: the explicit one, else the local
    /// file when present, else the global one.
    pub fn config_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            local
        } else {
            Self::global_config_path()
        }
    }

    /// Value of a dotted key, rendered for display.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "service.fixture" => self
                .service
                .fixture
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "form.max_extra_address_lines" => self.form.max_extra_address_lines.to_string(),
            "form.default_privacy" => self.form.default_privacy.to_string(),
            "output.no_color" => self.output.no_color.to_string(),
            "output.format" => self.output.format.clone(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_form_options() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.form_options(), FormOptions::default());
        assert_eq!(cfg.service.fixture, None);
        assert_eq!(cfg.output.format, "auto");
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domreg.toml");
        std::fs::write(
            &path,
            "[form]\ndefault_privacy = \"public\"\nmax_extra_address_lines = 2\n\n[service]\nfixture = \"backend.json\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.form.default_privacy, PrivacyProtection::Publicly);
        assert_eq!(cfg.form.max_extra_address_lines, 2);
        assert_eq!(cfg.service.fixture, Some(PathBuf::from("backend.json")));
        assert!(!cfg.output.no_color);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn every_known_key_resolves() {
        let cfg = AppConfig::default();
        for key in KNOWN_KEYS {
            assert!(cfg.get(key).is_some(), "{key}");
        }
        assert_eq!(cfg.get("form.default_privacy").as_deref(), Some("private"));
        assert_eq!(cfg.get("does.not.exist"), None);
    }

    #[test]
    fn config_path_prefers_explicit() {
        let explicit = Path::new("/tmp/custom.toml");
        assert_eq!(AppConfig::config_path(Some(explicit)), explicit);
        assert!(!AppConfig::global_config_path().as_os_str().is_empty());
    }
}
