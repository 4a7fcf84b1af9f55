//! CLI argument definitions using the clap derive API.
//!
//! Only argument names, help text and value enums live here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name    = "domreg",
    bin_name = "domreg",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Fill in, check and submit domain registration contact details",
    long_about = "domreg prefills domain registration contact details from the \
                  account, lets you adjust them, pre-checks them with the \
                  registration service and registers the domain.",
    after_help = "EXAMPLES:\n\
        \x20 domreg register example.blog --site-id 42 --fixture backend.toml\n\
        \x20 domreg register example.blog --site-id 42 --set email=ada@example.com --dry-run\n\
        \x20 domreg countries --states US\n\
        \x20 domreg completions bash > /usr/share/bash-completion/completions/domreg",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prefill, review and register a domain.
    #[command(
        visible_alias = "r",
        about = "Register a domain",
        after_help = "EXAMPLES:\n\
            \x20 domreg register example.blog --site-id 42\n\
            \x20 domreg register example.blog --site-id 42 --country GB --public --yes\n\
            \x20 domreg register example.blog --site-id 42 --address-line 'Suite 2' --dry-run"
    )]
    Register(RegisterArgs),

    /// List supported countries, or the states of one country.
    #[command(
        visible_alias = "ls",
        about = "List countries or states",
        after_help = "EXAMPLES:\n\
            \x20 domreg countries\n\
            \x20 domreg countries --states US"
    )]
    Countries(CountriesArgs),

    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 domreg init           # default location\n\
            \x20 domreg init --global  # global config\n\
            \x20 domreg init --local   # .domreg.toml in CWD"
    )]
    Init(InitArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 domreg completions bash > ~/.local/share/bash-completion/completions/domreg\n\
            \x20 domreg completions zsh  > ~/.zfunc/_domreg\n\
            \x20 domreg completions fish > ~/.config/fish/completions/domreg.fish"
    )]
    Completions(CompletionsArgs),

    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 domreg config get form.default_privacy\n\
            \x20 domreg config set service.fixture ./backend.toml\n\
            \x20 domreg config list"
    )]
    Config(ConfigCommands),
}

// ── register ──────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(value_name = "DOMAIN", help = "Domain name to register")]
    pub domain: String,

    #[arg(
        short = 's',
        long = "site-id",
        value_name = "ID",
        help = "Site the domain is registered for"
    )]
    pub site_id: u64,

    /// Overrides `service.fixture`.
    #[arg(
        short = 'f',
        long = "fixture",
        value_name = "FILE",
        help = "Registration service fixture (.json or .toml)"
    )]
    pub fixture: Option<PathBuf>,

    /// Set a field by wire key, e.g. `first_name=Ada` or `phone=7123456789`.
    #[arg(
        long = "set",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Set a form field (repeatable)"
    )]
    pub set: Vec<(String, String)>,

    #[arg(
        long = "country",
        value_name = "CODE|NAME",
        help = "Country, by ISO code or name"
    )]
    pub country: Option<String>,

    #[arg(
        long = "state",
        value_name = "CODE|NAME",
        help = "State, by code or name"
    )]
    pub state: Option<String>,

    #[arg(long = "public", help = "Register without privacy protection")]
    pub public: bool,

    /// Each value adds one extra address line after the first.
    #[arg(
        long = "address-line",
        value_name = "TEXT",
        help = "Add an extra address line (repeatable)"
    )]
    pub address_lines: Vec<String>,

    #[arg(long = "dry-run", help = "Print the payload instead of registering")]
    pub dry_run: bool,

    #[arg(short = 'y', long = "yes", help = "Skip confirmation and register")]
    pub yes: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

// ── countries ─────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CountriesArgs {
    #[arg(
        short = 'f',
        long = "fixture",
        value_name = "FILE",
        help = "Registration service fixture (.json or .toml)"
    )]
    pub fixture: Option<PathBuf>,

    #[arg(
        long = "states",
        value_name = "CODE",
        help = "List the states of this country instead"
    )]
    pub states: Option<String>,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(long = "global", conflicts_with = "local", help = "Create global configuration")]
    pub global: bool,

    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    #[arg(long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `form.default_privacy`.
        key: String,
    },
    /// Write a key to the configuration file.
    Set {
        key: String,
        value: String,
    },
    /// Print the resolved configuration.
    List,
    /// Print the path of the configuration file in use.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_color_env_accepts_conventional_values() {
        let parse = |value: &str| {
            // SAFETY: this is the only test that writes NO_COLOR, and it
            // restores the variable before returning.
            unsafe { std::env::set_var("NO_COLOR", value) };
            let parsed = Cli::try_parse_from(["domreg", "countries"]);
            unsafe { std::env::remove_var("NO_COLOR") };
            parsed.map(|cli| cli.global.no_color)
        };

        assert!(parse("1").unwrap());
        assert!(parse("yes").unwrap());
        assert!(!parse("0").unwrap());
        assert!(!parse("").unwrap());
    }

    #[test]
    fn parse_register_command() {
        let cli = Cli::parse_from([
            "domreg",
            "register",
            "example.blog",
            "--site-id",
            "42",
            "--set",
            "first_name=Ada",
            "--set",
            "organization=",
            "--address-line",
            "Suite 2",
            "--public",
        ]);
        let Commands::Register(args) = cli.command else {
            panic!("expected Register command");
        };
        assert_eq!(args.domain, "example.blog");
        assert_eq!(args.site_id, 42);
        assert_eq!(
            args.set,
            vec![
                ("first_name".to_string(), "Ada".to_string()),
                ("organization".to_string(), String::new()),
            ]
        );
        assert_eq!(args.address_lines, vec!["Suite 2".to_string()]);
        assert!(args.public);
    }

    #[test]
    fn set_requires_key_value() {
        assert!(parse_key_value("first_name").is_err());
        assert!(parse_key_value("=Ada").is_err());
        assert_eq!(
            parse_key_value("email=a=b@example.com").unwrap(),
            ("email".to_string(), "a=b@example.com".to_string())
        );
    }

    #[test]
    fn site_id_is_required() {
        let result = Cli::try_parse_from(["domreg", "register", "example.blog"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["domreg", "--quiet", "--verbose", "countries"]);
        assert!(result.is_err());
    }

    #[test]
    fn init_scopes_conflict() {
        let result = Cli::try_parse_from(["domreg", "init", "--global", "--local"]);
        assert!(result.is_err());
    }
}
