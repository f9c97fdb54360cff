//! Command handlers -- one module per subcommand

pub mod config;
pub mod fields;
pub mod send;
pub mod test_messages;

use syslogcef_cef::CefSender;
use syslogcef_core::config::SyslogCefConfig;
use syslogcef_core::transport::Transport;

use crate::error::CliError;

/// Build a sender from `[device]` and `[fields]` and register every `[[events]]` entry.
pub fn sender_from_config(
    config: &SyslogCefConfig,
    transport: impl Transport + 'static,
) -> Result<CefSender, CliError> {
    let sender = CefSender::builder(transport)
        .device(&config.device)
        .fields(&config.fields)
        .build();
    sender.register_all(&config.events)?;
    Ok(sender)
}

/// APP-NAME used by syslog transports that do not set `app_name`.
pub fn default_app_name(config: &SyslogCefConfig) -> &str {
    config.device.product.as_deref().unwrap_or("syslogcef")
}
