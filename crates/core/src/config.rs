//! 설정 관리 -- syslogcef.toml 파싱 및 런타임 설정
//!
//! [`SyslogCefConfig`]는 로깅, 장치 정보, 기본 필드, 전송 계층, 사전 정의 이벤트를
//! 모두 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SYSLOGCEF_TRANSPORT_HOST=10.0.0.5` 형식)
//! 3. 설정 파일 (`syslogcef.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), syslogcef_core::error::SyslogCefError> {
//! use syslogcef_core::config::SyslogCefConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SyslogCefConfig::load("syslogcef.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SyslogCefConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SyslogCefError};
use crate::types::FieldMap;

/// 허용되는 로그 레벨
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
/// 허용되는 로그 형식
const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];
/// 허용되는 전송 계층 종류
const VALID_TRANSPORT_KINDS: [&str; 2] = ["syslog", "stdout"];
/// 허용되는 syslog 프로토콜
pub const VALID_PROTOCOLS: [&str; 2] = ["TCP", "UDP"];
/// 허용되는 syslog 메시지 형식
pub const VALID_SYSLOG_FORMATS: [&str; 2] = ["rfc5424", "rfc3164"];
/// 허용되는 TCP 프레이밍 방식
pub const VALID_TCP_FRAMINGS: [&str; 2] = ["newline", "octet-counting"];
/// 허용되는 syslog facility 이름 (코드 순서)
pub const VALID_FACILITIES: [&str; 24] = [
    "kern", "user", "mail", "daemon", "auth", "syslog", "lpr", "news", "uucp", "cron", "authpriv",
    "ftp", "ntp", "audit", "alert", "clock", "local0", "local1", "local2", "local3", "local4",
    "local5", "local6", "local7",
];

/// syslogcef 통합 설정
///
/// `syslogcef.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyslogCefConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// CEF 헤더 장치 정보
    #[serde(default)]
    pub device: DeviceConfig,
    /// 모든 메시지에 포함되는 기본 필드
    #[serde(default)]
    pub fields: FieldMap,
    /// 전송 계층 목록 (둘 이상이면 선언 순서대로 팬아웃)
    #[serde(default = "default_transports")]
    pub transports: Vec<TransportConfig>,
    /// 사전 정의 이벤트
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

impl Default for SyslogCefConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            device: DeviceConfig::default(),
            fields: FieldMap::new(),
            transports: default_transports(),
            events: Vec::new(),
        }
    }
}

fn default_transports() -> Vec<TransportConfig> {
    vec![TransportConfig::default()]
}

impl SyslogCefConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SyslogCefError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SyslogCefError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SyslogCefError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SyslogCefError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SyslogCefError> {
        toml::from_str(toml_str).map_err(|e| {
            SyslogCefError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SYSLOGCEF_{SECTION}_{FIELD}`
    /// 전송 계층 오버라이드는 첫 번째 `[[transports]]` 항목에만 적용됩니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SYSLOGCEF_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SYSLOGCEF_GENERAL_LOG_FORMAT");

        // Device
        override_opt_string(&mut self.device.vendor, "SYSLOGCEF_DEVICE_VENDOR");
        override_opt_string(&mut self.device.product, "SYSLOGCEF_DEVICE_PRODUCT");
        override_opt_string(&mut self.device.version, "SYSLOGCEF_DEVICE_VERSION");

        // Transport
        if let Some(transport) = self.transports.first_mut() {
            override_string(&mut transport.kind, "SYSLOGCEF_TRANSPORT_KIND");
            override_string(&mut transport.host, "SYSLOGCEF_TRANSPORT_HOST");
            override_u16(&mut transport.port, "SYSLOGCEF_TRANSPORT_PORT");
            override_string(&mut transport.protocol, "SYSLOGCEF_TRANSPORT_PROTOCOL");
            override_string(&mut transport.format, "SYSLOGCEF_TRANSPORT_FORMAT");
            override_string(&mut transport.facility, "SYSLOGCEF_TRANSPORT_FACILITY");
            override_opt_string(&mut transport.hostname, "SYSLOGCEF_TRANSPORT_HOSTNAME");
        }
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 기본 필드(`[fields]`)는 여기서 검증하지 않습니다. 필드 카탈로그 검증은
    /// 이벤트가 처음 인코딩될 때 수행됩니다.
    pub fn validate(&self) -> Result<(), SyslogCefError> {
        if !VALID_LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", VALID_LOG_LEVELS.join(", ")),
            }
            .into());
        }

        if !VALID_LOG_FORMATS.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", VALID_LOG_FORMATS.join(", ")),
            }
            .into());
        }

        if self.transports.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "transports".to_owned(),
                reason: "at least one transport must be configured".to_owned(),
            }
            .into());
        }

        for (idx, transport) in self.transports.iter().enumerate() {
            transport.validate(idx)?;
        }

        for event in &self.events {
            if event.signature_id.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "events.signature_id".to_owned(),
                    reason: "signature id must not be empty".to_owned(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// CEF 헤더 장치 정보
///
/// 생략된 값은 인코더의 기본 리터럴(`CEF Vendor`, `CEF Product`, `1.0`)로 채워집니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// deviceVendor
    pub vendor: Option<String>,
    /// deviceProduct
    pub product: Option<String>,
    /// deviceVersion
    pub version: Option<String>,
}

/// 전송 계층 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// 종류 (syslog, stdout)
    pub kind: String,
    /// syslog 서버 호스트
    pub host: String,
    /// syslog 서버 포트
    pub port: u16,
    /// 전송 프로토콜 (TCP, UDP)
    pub protocol: String,
    /// syslog 메시지 형식 (rfc5424, rfc3164)
    pub format: String,
    /// syslog facility
    pub facility: String,
    /// APP-NAME / TAG (생략 시 deviceProduct)
    pub app_name: Option<String>,
    /// syslog 헤더 HOSTNAME (생략 시 시스템 호스트명)
    pub hostname: Option<String>,
    /// TCP 프레이밍 (newline, octet-counting)
    pub tcp_framing: String,
    /// RFC 5424 메시지 앞에 UTF-8 BOM 추가
    pub include_bom: bool,
    /// TCP 연결 타임아웃 (초, 0이면 OS 기본값)
    pub connect_timeout_secs: u64,
    /// 쓰기 타임아웃 (초, 0이면 무제한)
    pub write_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: "syslog".to_owned(),
            host: "127.0.0.1".to_owned(),
            port: 514,
            protocol: "UDP".to_owned(),
            format: "rfc5424".to_owned(),
            facility: "user".to_owned(),
            app_name: None,
            hostname: None,
            tcp_framing: "newline".to_owned(),
            include_bom: true,
            connect_timeout_secs: 5,
            write_timeout_secs: 5,
        }
    }
}

impl TransportConfig {
    /// 표준 출력 전송 설정을 생성합니다.
    pub fn stdout() -> Self {
        Self {
            kind: "stdout".to_owned(),
            ..Self::default()
        }
    }

    /// 전송 설정을 검증합니다. `idx`는 에러 메시지용 위치입니다.
    pub fn validate(&self, idx: usize) -> Result<(), SyslogCefError> {
        let field = |name: &str| format!("transports[{idx}].{name}");

        if !VALID_TRANSPORT_KINDS.contains(&self.kind.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: field("kind"),
                reason: format!("must be one of: {}", VALID_TRANSPORT_KINDS.join(", ")),
            }
            .into());
        }

        // stdout은 네트워크 설정을 사용하지 않음
        if self.kind == "stdout" {
            return Ok(());
        }

        if !VALID_PROTOCOLS.contains(&self.protocol.as_str()) {
            return Err(ConfigError::UnsupportedProtocol {
                protocol: self.protocol.clone(),
            }
            .into());
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: field("host"),
                reason: "host must not be empty".to_owned(),
            }
            .into());
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: field("port"),
                reason: "must be in range 1-65535".to_owned(),
            }
            .into());
        }

        if !is_one_of(&self.format, &VALID_SYSLOG_FORMATS) {
            return Err(ConfigError::InvalidValue {
                field: field("format"),
                reason: format!("must be one of: {}", VALID_SYSLOG_FORMATS.join(", ")),
            }
            .into());
        }

        if !is_one_of(&self.facility, &VALID_FACILITIES) {
            return Err(ConfigError::InvalidValue {
                field: field("facility"),
                reason: format!("must be one of: {}", VALID_FACILITIES.join(", ")),
            }
            .into());
        }

        if !is_one_of(&self.tcp_framing, &VALID_TCP_FRAMINGS) {
            return Err(ConfigError::InvalidValue {
                field: field("tcp_framing"),
                reason: format!("must be one of: {}", VALID_TCP_FRAMINGS.join(", ")),
            }
            .into());
        }

        Ok(())
    }
}

/// 사전 정의 이벤트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// 서명 ID
    pub signature_id: String,
    /// 이벤트 이름
    pub name: String,
    /// 심각도 (0-10)
    pub severity: u8,
    /// 이벤트 기본 필드
    #[serde(default)]
    pub fields: FieldMap,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = Some(val);
    }
}

/// 대소문자 구분 없이 `allowed` 중 하나인지 확인 (전송 계층 `FromStr`과 같은 규칙)
fn is_one_of(value: &str, allowed: &[&str]) -> bool {
    allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(value))
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = SyslogCefConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert!(config.device.vendor.is_none());
        assert_eq!(config.transports.len(), 1);
        assert_eq!(config.transports[0].protocol, "UDP");
        assert_eq!(config.transports[0].port, 514);
    }

    #[test]
    fn default_config_passes_validation() {
        SyslogCefConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = SyslogCefConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.transports[0].kind, "syslog");
    }

    #[test]
    fn from_str_full_toml() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "pretty"

[device]
vendor = "Github"
product = "test-syslogcef"
version = "14.1"

[fields]
sourceHostName = "probe-01"
deviceProcessId = 4242

[[transports]]
kind = "syslog"
host = "siem.example.com"
port = 6514
protocol = "TCP"
format = "rfc3164"
facility = "local4"
tcp_framing = "octet-counting"

[[transports]]
kind = "stdout"

[[events]]
signature_id = "100"
name = "Device is reachable"
severity = 1

[[events]]
signature_id = "102"
name = "Device is down"
severity = 10
fields = { reason = "Ping failed" }
"#;
        let config = SyslogCefConfig::parse(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.device.vendor.as_deref(), Some("Github"));
        assert_eq!(config.fields.get("deviceProcessId"), Some(&FieldValue::Int(4242)));
        assert_eq!(config.transports.len(), 2);
        assert_eq!(config.transports[0].protocol, "TCP");
        assert_eq!(config.transports[1].kind, "stdout");
        assert_eq!(config.events.len(), 2);
        assert_eq!(
            config.events[1].fields.get("reason"),
            Some(&FieldValue::from("Ping failed"))
        );
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = SyslogCefConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            SyslogCefError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_unsupported_protocol() {
        let mut config = SyslogCefConfig::default();
        config.transports[0].protocol = "HTTP".to_owned();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SyslogCefError::Config(ConfigError::UnsupportedProtocol { .. })
        ));
    }

    #[test]
    fn validate_rejects_port_zero() {
        let mut config = SyslogCefConfig::default();
        config.transports[0].port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn validate_rejects_unknown_facility() {
        let mut config = SyslogCefConfig::default();
        config.transports[0].facility = "local9".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("facility"));
    }

    #[test]
    fn validate_accepts_enumerations_in_any_case() {
        let mut config = SyslogCefConfig::default();
        config.transports[0].facility = "LOCAL3".to_owned();
        config.transports[0].format = "RFC3164".to_owned();
        config.transports[0].tcp_framing = "Octet-Counting".to_owned();
        config.validate().unwrap();

        // 프로토콜은 정확히 TCP/UDP만 허용
        config.transports[0].protocol = "udp".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_skips_network_checks_for_stdout() {
        let mut transport = TransportConfig::stdout();
        transport.protocol = "HTTP".to_owned();
        transport.validate(0).unwrap();
    }

    #[test]
    fn validate_rejects_empty_transport_list() {
        let mut config = SyslogCefConfig::default();
        config.transports.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("transports"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = SyslogCefConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    #[serial]
    fn env_overrides_apply_to_first_transport() {
        let mut config = SyslogCefConfig::default();
        config.transports.push(TransportConfig::stdout());
        // SAFETY: #[serial]로 환경변수를 조작하는 테스트를 직렬화합니다.
        unsafe {
            std::env::set_var("SYSLOGCEF_TRANSPORT_HOST", "10.1.2.3");
            std::env::set_var("SYSLOGCEF_TRANSPORT_PROTOCOL", "TCP");
            std::env::set_var("SYSLOGCEF_DEVICE_VENDOR", "Acme");
        }
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("SYSLOGCEF_TRANSPORT_HOST");
            std::env::remove_var("SYSLOGCEF_TRANSPORT_PROTOCOL");
            std::env::remove_var("SYSLOGCEF_DEVICE_VENDOR");
        }

        assert_eq!(config.transports[0].host, "10.1.2.3");
        assert_eq!(config.transports[0].protocol, "TCP");
        assert_eq!(config.transports[1].kind, "stdout");
        assert_eq!(config.device.vendor.as_deref(), Some("Acme"));
    }

    #[test]
    #[serial]
    fn env_override_invalid_port_keeps_original() {
        let mut port = 514;
        // SAFETY: #[serial]로 환경변수를 조작하는 테스트를 직렬화합니다.
        unsafe { std::env::set_var("TEST_SYSLOGCEF_PORT_BAD", "not-a-port") };
        override_u16(&mut port, "TEST_SYSLOGCEF_PORT_BAD");
        assert_eq!(port, 514);
        unsafe { std::env::remove_var("TEST_SYSLOGCEF_PORT_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_SYSLOGCEF_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let mut config = SyslogCefConfig::default();
        config.fields.insert("sourceHostName", "probe-01");
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = SyslogCefConfig::parse(&toml_str).unwrap();
        assert_eq!(parsed.transports[0].host, config.transports[0].host);
        assert_eq!(parsed.fields, config.fields);
    }

    #[test]
    fn from_file_not_found() {
        let err = SyslogCefConfig::from_file("/nonexistent/path/syslogcef.toml").unwrap_err();
        assert!(matches!(
            err,
            SyslogCefError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
