//! `syslogcef send` command handler

use std::io::Write;

use serde::Serialize;
use tracing::info;

use syslogcef_core::config::SyslogCefConfig;
use syslogcef_core::types::FieldMap;
use syslogcef_transport::StdoutTransport;

use super::{default_app_name, sender_from_config};
use crate::cli::SendArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `send` command.
///
/// With `--dry-run` the line is built with the same defaults and events
/// but no transport is opened.
pub fn execute(
    args: SendArgs,
    config: &SyslogCefConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run(&args, config)?;
    writer.render(&report)
}

/// Build (and unless dry-run, deliver) one event from the configuration.
pub fn run(args: &SendArgs, config: &SyslogCefConfig) -> Result<SendReport, CliError> {
    let fields: FieldMap = args.fields.iter().cloned().collect();

    if args.dry_run {
        let sender = sender_from_config(config, StdoutTransport::with_writer(std::io::sink()))?;
        let line = sender.build_message(&args.signature_id, &fields)?;
        return Ok(SendReport {
            signature_id: args.signature_id.clone(),
            line,
            transport: None,
        });
    }

    let transport = syslogcef_transport::from_config(&config.transports, default_app_name(config))?;
    let sender = sender_from_config(config, transport)?;
    let line = sender.send_message(&args.signature_id, &fields)?.to_string();
    info!(signature_id = %args.signature_id, transport = sender.transport_name(), "event sent");

    Ok(SendReport {
        signature_id: args.signature_id.clone(),
        line,
        transport: Some(sender.transport_name().to_owned()),
    })
}

/// Result of a `send` invocation.
#[derive(Debug, Serialize)]
pub struct SendReport {
    pub signature_id: String,
    pub line: String,
    /// `None` for dry runs.
    pub transport: Option<String>,
}

impl Render for SendReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        match &self.transport {
            Some(transport) => writeln!(
                w,
                "{} {} via {}",
                "Sent".green().bold(),
                self.signature_id.bold(),
                transport
            )?,
            None => writeln!(w, "{} {}", "Dry run".yellow().bold(), self.signature_id.bold())?,
        }
        writeln!(w, "{}", self.line)
    }
}
