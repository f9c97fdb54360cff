//! syslogcef CLI binary

use std::process;

use clap::Parser;
use colored::Colorize;

use syslogcef_cli::cli::{Cli, Commands};
use syslogcef_cli::commands;
use syslogcef_cli::error::CliError;
use syslogcef_cli::output::OutputWriter;
use syslogcef_cli::{load_config, logging};

fn main() {
    let cli = Cli::parse();

    let config = load_config(&cli.config, cli.command.config_optional());

    let mut general = config
        .as_ref()
        .map(|c| c.general.clone())
        .unwrap_or_default();
    match &cli.log_level {
        Some(level) => general.log_level = level.clone(),
        None if cli.command.quiet_by_default() => {
            general.log_level = logging::QUIET_LEVEL.to_owned();
        }
        None => {}
    }
    if let Err(e) = logging::init_tracing(&general) {
        eprintln!("{} failed to initialise logging: {e:#}", "warning:".yellow().bold());
    }
    syslogcef_core::metrics::describe_all();

    if let Err(e) = run(cli, config) {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(e.exit_code());
    }
}

fn run(
    cli: Cli,
    config: Result<syslogcef_core::config::SyslogCefConfig, CliError>,
) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::TestMessages(args) => commands::test_messages::execute(args, &writer),
        Commands::Fields(args) => commands::fields::execute(args, &writer),
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer),
        Commands::Send(args) => commands::send::execute(args, &config?, &writer),
    }
}
