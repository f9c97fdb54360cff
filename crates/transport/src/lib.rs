//! syslogcef 전송 계층
//!
//! 완성된 CEF 라인을 목적지로 보내는 [`Transport`] 구현 모음입니다.
//!
//! - [`SyslogTransport`]: syslog 서버로 직접 전송 (TCP/UDP, RFC 5424/3164)
//! - [`StdoutTransport`]: 표준 출력 (또는 임의의 writer)
//! - [`CompositeTransport`]: 여러 전송 계층으로 팬아웃
//!
//! [`from_config`]는 설정 파일의 `[[transports]]` 목록으로 전송 계층을 만듭니다.

pub mod composite;
pub mod framing;
pub mod stdout;
pub mod syslog;

use syslogcef_core::config::TransportConfig;
use syslogcef_core::error::{ConfigError, SyslogCefError};
use syslogcef_core::transport::Transport;
use tracing::debug;

pub use composite::CompositeTransport;
pub use framing::{Facility, SyslogFormat, SyslogHeader, TcpFraming};
pub use stdout::StdoutTransport;
pub use syslog::{Protocol, SyslogTransport, SyslogTransportConfig};

/// 시스템 호스트명. 알 수 없으면 NILVALUE(`-`)
pub fn local_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "-".to_owned())
}

/// 설정 목록으로 전송 계층을 만듭니다.
///
/// 항목이 하나면 그 전송 계층을, 여러 개면 선언 순서대로 [`CompositeTransport`]를 반환합니다.
/// `app_name`이 없는 syslog 항목은 `default_app_name`을 APP-NAME으로 사용합니다.
pub fn from_config(
    configs: &[TransportConfig],
    default_app_name: &str,
) -> Result<Box<dyn Transport>, SyslogCefError> {
    let mut transports = configs
        .iter()
        .map(|config| build_one(config, default_app_name))
        .collect::<Result<Vec<_>, _>>()?;

    match transports.len() {
        0 => Err(ConfigError::InvalidValue {
            field: "transports".to_owned(),
            reason: "at least one transport is required".to_owned(),
        }
        .into()),
        1 => Ok(transports.remove(0)),
        n => {
            debug!(members = n, "building composite transport");
            Ok(Box::new(CompositeTransport::new(transports)))
        }
    }
}

fn build_one(config: &TransportConfig, default_app_name: &str) -> Result<Box<dyn Transport>, SyslogCefError> {
    match config.kind.as_str() {
        "stdout" => Ok(Box::new(StdoutTransport::new())),
        "syslog" => {
            let syslog = SyslogTransportConfig::from_core(config, default_app_name)?;
            Ok(Box::new(SyslogTransport::connect(syslog)?))
        }
        other => Err(ConfigError::InvalidValue {
            field: "kind".to_owned(),
            reason: format!("unknown transport kind '{other}'"),
        }
        .into()),
    }
}
