//! syslogcef.toml 통합 설정 테스트
//!
//! - syslogcef.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 파일 로딩 / 잘못된 형식 에러 테스트

use std::fs;

use syslogcef_core::config::SyslogCefConfig;
use syslogcef_core::error::{ConfigError, SyslogCefError};
use syslogcef_core::types::FieldValue;
use tempfile::TempDir;

// =============================================================================
// syslogcef.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../syslogcef.toml.example");
    let config = SyslogCefConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.device.vendor.as_deref(), Some("syslogcef"));
    assert!(config.fields.is_empty());
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../syslogcef.toml.example");
    let config = SyslogCefConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_transport_matches_code_defaults() {
    let content = include_str!("../../../syslogcef.toml.example");
    let from_file = SyslogCefConfig::parse(content).expect("should parse");
    let from_code = SyslogCefConfig::default();

    let file_t = &from_file.transports[0];
    let code_t = &from_code.transports[0];
    assert_eq!(file_t.kind, code_t.kind);
    assert_eq!(file_t.host, code_t.host);
    assert_eq!(file_t.port, code_t.port);
    assert_eq!(file_t.protocol, code_t.protocol);
    assert_eq!(file_t.format, code_t.format);
    assert_eq!(file_t.facility, code_t.facility);
    assert_eq!(file_t.tcp_framing, code_t.tcp_framing);
    assert_eq!(file_t.include_bom, code_t.include_bom);
    assert_eq!(file_t.connect_timeout_secs, code_t.connect_timeout_secs);
    assert_eq!(file_t.write_timeout_secs, code_t.write_timeout_secs);
}

#[test]
fn example_config_declares_test_events() {
    let content = include_str!("../../../syslogcef.toml.example");
    let config = SyslogCefConfig::parse(content).expect("should parse");

    let ids: Vec<&str> = config
        .events
        .iter()
        .map(|e| e.signature_id.as_str())
        .collect();
    assert_eq!(ids, vec!["1113-100", "1113-101", "1113-102"]);
    assert_eq!(config.events[2].severity, 9);
    assert_eq!(
        config.events[2].fields.get("reason"),
        Some(&FieldValue::from("This is only a test."))
    );
}

// =============================================================================
// 부분 설정 로딩 테스트
// =============================================================================

#[test]
fn partial_config_device_only() {
    let toml = r#"
[device]
product = "test-syslogcef"
"#;
    let config = SyslogCefConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.device.product.as_deref(), Some("test-syslogcef"));
    assert!(config.device.vendor.is_none());
    // 나머지 섹션은 기본값
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.transports.len(), 1);
}

#[test]
fn partial_transport_fills_defaults() {
    let toml = r#"
[[transports]]
host = "siem.internal"
protocol = "TCP"
"#;
    let config = SyslogCefConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    let transport = &config.transports[0];
    assert_eq!(transport.host, "siem.internal");
    assert_eq!(transport.protocol, "TCP");
    assert_eq!(transport.port, 514);
    assert_eq!(transport.format, "rfc5424");
}

#[test]
fn out_of_range_port_fails_to_parse() {
    let toml = r#"
[[transports]]
port = 70000
"#;
    let err = SyslogCefConfig::parse(toml).unwrap_err();
    assert!(matches!(
        err,
        SyslogCefError::Config(ConfigError::ParseFailed { .. })
    ));
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[test]
fn load_valid_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("syslogcef.toml");
    fs::write(
        &config_path,
        "[device]\nvendor = \"Github\"\n\n[[transports]]\nkind = \"stdout\"\n",
    )
    .expect("should write config");

    let config = SyslogCefConfig::load(&config_path).expect("should load");
    assert_eq!(config.transports[0].kind, "stdout");
}

#[test]
fn load_rejects_unsupported_protocol() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[[transports]]\nprotocol = \"HTTP\"\n").expect("should write config");

    let err = SyslogCefConfig::load(&config_path).unwrap_err();
    assert!(matches!(
        err,
        SyslogCefError::Config(ConfigError::UnsupportedProtocol { .. })
    ));
}

#[test]
fn load_malformed_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(&config_path, "[general\nlog_level = \"info\"\n").expect("should write config");

    assert!(SyslogCefConfig::load(&config_path).is_err());
}

#[test]
fn load_missing_file() {
    let err = SyslogCefConfig::load("/nonexistent/syslogcef.toml").unwrap_err();
    assert!(matches!(
        err,
        SyslogCefError::Config(ConfigError::FileNotFound { .. })
    ));
}
