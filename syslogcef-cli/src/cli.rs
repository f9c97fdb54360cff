//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// syslogcef -- send Common Event Format messages over syslog.
///
/// Use `syslogcef <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "syslogcef", version, about, long_about = None)]
pub struct Cli {
    /// Path to the syslogcef.toml configuration file.
    #[arg(short, long, default_value = "syslogcef.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send the three canonical test messages to a syslog server.
    TestMessages(TestMessagesArgs),

    /// Send one pre-declared event through the configured transports.
    Send(SendArgs),

    /// Manage configuration.
    Config(ConfigArgs),

    /// List the CEF field catalog.
    Fields(FieldsArgs),
}

impl Commands {
    /// Whether the command can run without a configuration file on disk.
    pub fn config_optional(&self) -> bool {
        matches!(self, Self::TestMessages(_) | Self::Fields(_))
    }

    /// Whether the command logs at `warn` unless a level is given explicitly.
    pub fn quiet_by_default(&self) -> bool {
        matches!(self, Self::TestMessages(_) | Self::Fields(_))
    }
}

// ---- test-messages ----

/// Send three test events (OK, WARN, ERROR) to a syslog server.
#[derive(Args, Debug)]
pub struct TestMessagesArgs {
    /// Syslog server host.
    #[arg(long)]
    pub host: String,

    /// Syslog server port (1-65535).
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Syslog server protocol ('TCP' or 'UDP').
    #[arg(long)]
    pub protocol: String,

    /// Syslog message format (rfc5424, rfc3164).
    #[arg(long, default_value = "rfc5424")]
    pub format: String,

    /// Also print every CEF line to stdout.
    #[arg(long)]
    pub stdout: bool,
}

// ---- send ----

/// Send one event declared in `[[events]]`.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Signature id of the event to send.
    pub signature_id: String,

    /// Call-time field (repeatable), e.g. `--field message=hello`.
    #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Print the CEF line instead of sending it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Parse a `key=value` pair. The value may itself contain `=`.
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

// ---- config ----

/// Manage syslogcef configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, device, fields, transports, events).
        #[arg(long)]
        section: Option<String>,
    },
}

// ---- fields ----

/// List the CEF field catalog.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Only show fields whose name contains this text (case-insensitive).
    #[arg(long)]
    pub filter: Option<String>,
}
