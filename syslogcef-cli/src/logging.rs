//! Tracing setup for the syslogcef CLI.
//!
//! Logs always go to stderr; stdout is reserved for CEF lines written by the
//! stdout transport and for command reports.

use anyhow::{Context, Result, bail};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use syslogcef_core::config::GeneralConfig;

/// Crates whose events follow the configured level. Everything else stays at `warn`.
const OWN_CRATES: [&str; 4] = [
    "syslogcef_core",
    "syslogcef_cef",
    "syslogcef_transport",
    "syslogcef_cli",
];

/// Level used by one-shot commands when neither `--log-level` nor `RUST_LOG` is set.
pub const QUIET_LEVEL: &str = "warn";

/// Filter directives that apply `level` to the syslogcef crates only.
///
/// `directives("debug")` == `"warn,syslogcef_core=debug,syslogcef_cef=debug,..."`
pub fn directives(level: &str) -> String {
    std::iter::once(QUIET_LEVEL.to_owned())
        .chain(OWN_CRATES.iter().map(|krate| format!("{krate}={level}")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `config.log_level`.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directives(&config.log_level))
            .with_context(|| format!("invalid log level '{}'", config.log_level))?,
    };

    let output: Box<dyn Layer<Registry> + Send + Sync> = match config.log_format.as_str() {
        "json" => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        "pretty" => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        other => bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    };

    tracing_subscriber::registry()
        .with(output)
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")
}
