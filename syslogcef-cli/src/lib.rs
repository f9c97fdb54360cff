//! syslogcef CLI library
//!
//! Exposes the command handlers so integration tests can drive them without
//! spawning the binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

use std::path::Path;

use syslogcef_core::config::SyslogCefConfig;

use crate::error::CliError;

/// Load the configuration file.
///
/// When `optional` is set and the file does not exist, the defaults are used
/// with environment overrides applied.
pub fn load_config(path: &Path, optional: bool) -> Result<SyslogCefConfig, CliError> {
    if optional && !path.exists() {
        let mut config = SyslogCefConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        return Ok(config);
    }
    Ok(SyslogCefConfig::load(path)?)
}
