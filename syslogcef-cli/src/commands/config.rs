//! `syslogcef config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use syslogcef_core::config::SyslogCefConfig;
use syslogcef_transport::StdoutTransport;

use super::sender_from_config;
use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show --section`.
const SECTIONS: [&str; 5] = ["general", "device", "fields", "transports", "events"];

/// Execute the `config` command.
pub fn execute(args: ConfigArgs, config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => {
            let report = validate(config_path);
            writer.render(&report)?;
            if report.valid {
                Ok(())
            } else {
                Err(CliError::Config(
                    report.errors.first().cloned().unwrap_or_default(),
                ))
            }
        }
        ConfigAction::Show { section } => {
            let config = SyslogCefConfig::load(config_path)?;
            let report = show(&config, section.as_deref())?;
            writer.render(&report)
        }
    }
}

/// Load the file, then trial-register every `[[events]]` entry against the
/// configured device and default fields.
pub fn validate(config_path: &Path) -> ConfigValidationReport {
    let path = config_path.display().to_string();
    let config = match SyslogCefConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            return ConfigValidationReport {
                config_path: path,
                valid: false,
                errors: vec![e.to_string()],
                events: 0,
                transports: 0,
            };
        }
    };

    let mut errors = Vec::new();
    if let Err(e) = sender_from_config(&config, StdoutTransport::with_writer(std::io::sink())) {
        errors.push(e.to_string());
    }

    ConfigValidationReport {
        config_path: path,
        valid: errors.is_empty(),
        errors,
        events: config.events.len(),
        transports: config.transports.len(),
    }
}

/// Serialise the whole configuration or one section of it.
pub fn show(config: &SyslogCefConfig, section: Option<&str>) -> Result<ConfigReport, CliError> {
    let value = match section {
        None => serde_json::to_value(config)?,
        Some("general") => serde_json::to_value(&config.general)?,
        Some("device") => serde_json::to_value(&config.device)?,
        Some("fields") => serde_json::to_value(&config.fields)?,
        Some("transports") => serde_json::to_value(&config.transports)?,
        Some("events") => serde_json::to_value(&config.events)?,
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section '{other}', expected one of: {}",
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(ConfigReport {
        section: section.map(str::to_owned),
        config: value,
    })
}

/// Result of `config validate`.
#[derive(Debug, Serialize)]
pub struct ConfigValidationReport {
    pub config_path: String,
    pub valid: bool,
    pub errors: Vec<String>,
    pub events: usize,
    pub transports: usize,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.valid {
            writeln!(
                w,
                "{} {} ({} events, {} transports)",
                "Valid:".green().bold(),
                self.config_path,
                self.events,
                self.transports
            )
        } else {
            writeln!(w, "{} {}", "Invalid:".red().bold(), self.config_path)?;
            for error in &self.errors {
                writeln!(w, "  - {}", error)?;
            }
            Ok(())
        }
    }
}

/// Result of `config show`.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub section: Option<String>,
    pub config: serde_json::Value,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(section) = &self.section {
            writeln!(w, "[{}]", section.bold())?;
        }
        let pretty = serde_json::to_string_pretty(&self.config).map_err(std::io::Error::other)?;
        writeln!(w, "{}", pretty)
    }
}
