//! CLI-specific error types and exit code mapping

use syslogcef_core::error::{FieldError, LookupError, SyslogCefError};

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// A field failed catalog validation.
    #[error("field error: {0}")]
    Field(#[from] FieldError),

    /// The requested event is not declared.
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// The transport could not deliver the message.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SyslogCefError> for CliError {
    fn from(e: SyslogCefError) -> Self {
        match e {
            SyslogCefError::Field(e) => Self::Field(e),
            SyslogCefError::Lookup(e) => Self::Lookup(e),
            SyslogCefError::Config(e) => Self::Config(e.to_string()),
            SyslogCefError::Delivery(e) => Self::Delivery(e.to_string()),
            SyslogCefError::Io(e) => Self::Io(e),
        }
    }
}

impl From<syslogcef_core::error::ConfigError> for CliError {
    fn from(e: syslogcef_core::error::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<syslogcef_core::error::DeliveryError> for CliError {
    fn from(e: syslogcef_core::error::DeliveryError) -> Self {
        Self::Delivery(e.to_string())
    }
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                              |
    /// |------|--------------------------------------|
    /// | 0    | Success                              |
    /// | 1    | General / command error              |
    /// | 2    | Configuration error                  |
    /// | 3    | Invalid field or unknown event       |
    /// | 4    | Delivery failed                      |
    /// | 10   | IO error                             |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Field(_) | Self::Lookup(_) => 3,
            Self::Delivery(_) => 4,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}
