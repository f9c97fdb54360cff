//! `syslogcef fields` command handler

use std::io::Write;

use serde::Serialize;

use syslogcef_cef::catalog;

use crate::cli::FieldsArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `fields` command.
pub fn execute(args: FieldsArgs, writer: &OutputWriter) -> Result<(), CliError> {
    writer.render(&list(args.filter.as_deref()))
}

/// Catalog entries whose name contains `filter` (case-insensitive).
pub fn list(filter: Option<&str>) -> FieldsReport {
    let needle = filter.map(str::to_lowercase);
    let fields = catalog::fields()
        .iter()
        .filter(|spec| {
            needle
                .as_deref()
                .is_none_or(|n| spec.name.to_lowercase().contains(n))
        })
        .map(|spec| FieldRow {
            name: spec.name.to_owned(),
            key: spec.extension_key().map(str::to_owned),
            kind: spec.kind.describe(),
        })
        .collect();
    FieldsReport { fields }
}

#[derive(Debug, Serialize)]
pub struct FieldsReport {
    pub fields: Vec<FieldRow>,
}

#[derive(Debug, Serialize)]
pub struct FieldRow {
    pub name: String,
    /// Extension key, `None` for header fields.
    pub key: Option<String>,
    pub kind: String,
}

impl Render for FieldsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if self.fields.is_empty() {
            return writeln!(w, "No matching fields.");
        }

        writeln!(
            w,
            "{:<28} {:<14} {}",
            "NAME".bold(),
            "KEY".bold(),
            "TYPE".bold()
        )?;
        for row in &self.fields {
            writeln!(
                w,
                "{:<28} {:<14} {}",
                row.name,
                row.key.as_deref().unwrap_or("(header)"),
                row.kind
            )?;
        }
        Ok(())
    }
}
