//! CEF 필드 카탈로그
//!
//! 알려진 CEF 필드 이름, 검증 규칙, 익스텐션 키 약어를 담은 고정 테이블입니다.
//! 사용자가 확장할 수 없으며, 카탈로그에 없는 필드 이름은 항상 거부됩니다.
//!
//! 필드 이름은 CEF 사전의 전체 이름(`message`, `sourceAddress`, `transportProtocol`
//! 등)을 사용합니다. 약어(`msg`, `src`)나 임의 이름(`host`, `port`)은 알 수 없는
//! 필드로 취급됩니다.
//!
//! # 사용 예시
//! ```
//! use syslogcef_cef::catalog;
//! use syslogcef_core::FieldValue;
//!
//! let value = catalog::validate("sourcePort", &FieldValue::from("443")).unwrap();
//! assert_eq!(value, FieldValue::Int(443));
//! assert_eq!(catalog::lookup("message").unwrap().extension_key(), Some("msg"));
//! ```

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use syslogcef_core::error::FieldError;
use syslogcef_core::types::FieldValue;

/// 일반 문자열 필드 최대 길이
pub const MAX_STRING_LEN: usize = 1023;

/// 최대 심각도
pub const MAX_SEVERITY: i64 = 10;

/// `transportProtocol` 허용 값
pub const TRANSPORT_PROTOCOLS: &[&str] = &["TCP", "UDP", "ICMP", "ICMPv6", "SCTP", "GRE", "ESP", "AH"];

/// `deviceDirection` 허용 값 (0 inbound, 1 outbound)
const DIRECTIONS: &[&str] = &["0", "1"];

/// 타임스탬프 문자열 형식 (`Jan 15 2024 12:00:00`)
const CEF_TIMESTAMP_FORMAT: &str = "%b %d %Y %H:%M:%S";

static MAC_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}([:-])[0-9A-Fa-f]{2}(?:[:-][0-9A-Fa-f]{2}){4}$")
        .expect("MAC address pattern is valid")
});

/// 필드 값의 종류와 검증 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 최대 길이가 있는 문자열
    String { max_len: usize },
    /// 정수 (i64)
    Integer,
    /// 포트 번호 (0-65535)
    Port,
    /// CEF 심각도 (0-10)
    Severity,
    /// IPv4 또는 IPv6 주소 문자열
    IpAddress,
    /// MAC 주소 문자열
    MacAddress,
    /// epoch 밀리초, RFC 3339, 또는 `MMM dd yyyy HH:mm:ss`
    Timestamp,
    /// 고정 집합 중 하나 (대소문자 무시, 정규 표기로 변환)
    Enumeration(&'static [&'static str]),
}

impl FieldKind {
    /// 문자열 계열 규칙인지 확인합니다.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String { .. })
    }

    /// 사람이 읽을 수 있는 규칙 설명
    pub fn describe(&self) -> String {
        match self {
            Self::String { max_len } => format!("string (max {max_len})"),
            Self::Integer => "integer".to_owned(),
            Self::Port => "port (0-65535)".to_owned(),
            Self::Severity => format!("severity (0-{MAX_SEVERITY})"),
            Self::IpAddress => "IP address".to_owned(),
            Self::MacAddress => "MAC address".to_owned(),
            Self::Timestamp => "timestamp".to_owned(),
            Self::Enumeration(allowed) => format!("one of {}", allowed.join("|")),
        }
    }
}

/// CEF 메시지에서 필드가 위치하는 곳
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// 파이프로 구분된 헤더
    Header,
    /// `key=value` 익스텐션 (약어 키)
    Extension(&'static str),
}

/// 카탈로그 항목
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// 필드 전체 이름
    pub name: &'static str,
    /// 위치
    pub placement: Placement,
    /// 검증 규칙
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn header(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            placement: Placement::Header,
            kind,
        }
    }

    const fn ext(name: &'static str, key: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            placement: Placement::Extension(key),
            kind,
        }
    }

    /// 익스텐션 키 약어 (헤더 필드는 `None`)
    pub fn extension_key(&self) -> Option<&'static str> {
        match self.placement {
            Placement::Header => None,
            Placement::Extension(key) => Some(key),
        }
    }

    /// 헤더 필드인지 확인합니다.
    pub fn is_header(&self) -> bool {
        self.placement == Placement::Header
    }
}

const fn s(max_len: usize) -> FieldKind {
    FieldKind::String { max_len }
}

const TEXT: FieldKind = s(MAX_STRING_LEN);
const INT: FieldKind = FieldKind::Integer;
const PORT: FieldKind = FieldKind::Port;
const IP: FieldKind = FieldKind::IpAddress;
const MAC: FieldKind = FieldKind::MacAddress;
const TIME: FieldKind = FieldKind::Timestamp;

/// 전체 카탈로그 테이블
static CATALOG: &[FieldSpec] = &[
    // 헤더
    FieldSpec::header("deviceVendor", s(63)),
    FieldSpec::header("deviceProduct", s(63)),
    FieldSpec::header("deviceVersion", s(31)),
    FieldSpec::header("signatureId", TEXT),
    FieldSpec::header("name", s(512)),
    FieldSpec::header("severity", FieldKind::Severity),
    // 장치
    FieldSpec::ext("deviceAction", "act", s(63)),
    FieldSpec::ext("applicationProtocol", "app", s(31)),
    FieldSpec::ext("baseEventCount", "cnt", INT),
    FieldSpec::ext("deviceAddress", "dvc", IP),
    FieldSpec::ext("deviceHostName", "dvchost", s(100)),
    FieldSpec::ext("deviceMacAddress", "dvcmac", MAC),
    FieldSpec::ext("deviceProcessId", "dvcpid", INT),
    FieldSpec::ext("deviceProcessName", "deviceProcessName", TEXT),
    FieldSpec::ext("deviceEventCategory", "cat", TEXT),
    FieldSpec::ext("deviceExternalId", "deviceExternalId", s(255)),
    FieldSpec::ext("deviceFacility", "deviceFacility", TEXT),
    FieldSpec::ext("deviceDirection", "deviceDirection", FieldKind::Enumeration(DIRECTIONS)),
    FieldSpec::ext("deviceInboundInterface", "deviceInboundInterface", s(128)),
    FieldSpec::ext("deviceOutboundInterface", "deviceOutboundInterface", s(128)),
    FieldSpec::ext("deviceReceiptTime", "rt", TIME),
    FieldSpec::ext("deviceTimeZone", "dtz", s(255)),
    // 이벤트
    FieldSpec::ext("message", "msg", TEXT),
    FieldSpec::ext("reason", "reason", TEXT),
    FieldSpec::ext("eventOutcome", "outcome", s(63)),
    FieldSpec::ext("externalId", "externalId", s(40)),
    FieldSpec::ext("eventId", "eventId", INT),
    FieldSpec::ext("startTime", "start", TIME),
    FieldSpec::ext("endTime", "end", TIME),
    FieldSpec::ext("bytesIn", "in", INT),
    FieldSpec::ext("bytesOut", "out", INT),
    FieldSpec::ext("transportProtocol", "proto", FieldKind::Enumeration(TRANSPORT_PROTOCOLS)),
    // 요청
    FieldSpec::ext("requestUrl", "request", TEXT),
    FieldSpec::ext("requestMethod", "requestMethod", TEXT),
    FieldSpec::ext("requestClientApplication", "requestClientApplication", TEXT),
    FieldSpec::ext("requestContext", "requestContext", TEXT),
    // 출발지
    FieldSpec::ext("sourceAddress", "src", IP),
    FieldSpec::ext("sourceHostName", "shost", TEXT),
    FieldSpec::ext("sourceMacAddress", "smac", MAC),
    FieldSpec::ext("sourceNtDomain", "sntdom", s(255)),
    FieldSpec::ext("sourcePort", "spt", PORT),
    FieldSpec::ext("sourceProcessId", "spid", INT),
    FieldSpec::ext("sourceProcessName", "sproc", TEXT),
    FieldSpec::ext("sourceUserId", "suid", TEXT),
    FieldSpec::ext("sourceUserName", "suser", TEXT),
    FieldSpec::ext("sourceUserPrivileges", "spriv", TEXT),
    FieldSpec::ext("sourceTranslatedAddress", "sourceTranslatedAddress", IP),
    FieldSpec::ext("sourceTranslatedPort", "sourceTranslatedPort", PORT),
    // 목적지
    FieldSpec::ext("destinationAddress", "dst", IP),
    FieldSpec::ext("destinationHostName", "dhost", TEXT),
    FieldSpec::ext("destinationMacAddress", "dmac", MAC),
    FieldSpec::ext("destinationNtDomain", "dntdom", s(255)),
    FieldSpec::ext("destinationPort", "dpt", PORT),
    FieldSpec::ext("destinationProcessId", "dpid", INT),
    FieldSpec::ext("destinationProcessName", "dproc", TEXT),
    FieldSpec::ext("destinationUserId", "duid", TEXT),
    FieldSpec::ext("destinationUserName", "duser", TEXT),
    FieldSpec::ext("destinationUserPrivileges", "dpriv", TEXT),
    FieldSpec::ext("destinationTranslatedAddress", "destinationTranslatedAddress", IP),
    FieldSpec::ext("destinationTranslatedPort", "destinationTranslatedPort", PORT),
    // 파일
    FieldSpec::ext("fileName", "fname", TEXT),
    FieldSpec::ext("filePath", "filePath", TEXT),
    FieldSpec::ext("fileSize", "fsize", INT),
    FieldSpec::ext("fileHash", "fileHash", s(255)),
    FieldSpec::ext("fileType", "fileType", TEXT),
    // 사용자 정의
    FieldSpec::ext("deviceCustomString1", "cs1", s(4000)),
    FieldSpec::ext("deviceCustomString1Label", "cs1Label", TEXT),
    FieldSpec::ext("deviceCustomString2", "cs2", s(4000)),
    FieldSpec::ext("deviceCustomString2Label", "cs2Label", TEXT),
    FieldSpec::ext("deviceCustomString3", "cs3", s(4000)),
    FieldSpec::ext("deviceCustomString3Label", "cs3Label", TEXT),
    FieldSpec::ext("deviceCustomString4", "cs4", s(4000)),
    FieldSpec::ext("deviceCustomString4Label", "cs4Label", TEXT),
    FieldSpec::ext("deviceCustomString5", "cs5", s(4000)),
    FieldSpec::ext("deviceCustomString5Label", "cs5Label", TEXT),
    FieldSpec::ext("deviceCustomString6", "cs6", s(4000)),
    FieldSpec::ext("deviceCustomString6Label", "cs6Label", TEXT),
    FieldSpec::ext("deviceCustomNumber1", "cn1", INT),
    FieldSpec::ext("deviceCustomNumber1Label", "cn1Label", TEXT),
    FieldSpec::ext("deviceCustomNumber2", "cn2", INT),
    FieldSpec::ext("deviceCustomNumber2Label", "cn2Label", TEXT),
    FieldSpec::ext("deviceCustomNumber3", "cn3", INT),
    FieldSpec::ext("deviceCustomNumber3Label", "cn3Label", TEXT),
    FieldSpec::ext("flexString1", "flexString1", s(1023)),
    FieldSpec::ext("flexString1Label", "flexString1Label", s(128)),
    FieldSpec::ext("flexString2", "flexString2", s(1023)),
    FieldSpec::ext("flexString2Label", "flexString2Label", s(128)),
];

static BY_NAME: LazyLock<HashMap<&'static str, &'static FieldSpec>> =
    LazyLock::new(|| CATALOG.iter().map(|spec| (spec.name, spec)).collect());

/// 전체 카탈로그를 선언 순서대로 반환합니다.
pub fn fields() -> &'static [FieldSpec] {
    CATALOG
}

/// 필드 이름으로 카탈로그 항목을 찾습니다.
pub fn lookup(name: &str) -> Option<&'static FieldSpec> {
    BY_NAME.get(name).copied()
}

/// 필드 값을 검증하고 정규화된 값을 반환합니다.
///
/// - 정수 계열 규칙은 정수로 파싱되는 문자열도 허용하며 정수로 정규화합니다.
/// - 문자열 규칙은 정수도 허용하며 10진 문자열로 정규화합니다.
/// - 열거형은 대소문자를 무시하고 카탈로그의 정규 표기로 변환합니다.
pub fn validate(name: &str, value: &FieldValue) -> Result<FieldValue, FieldError> {
    let spec = lookup(name).ok_or_else(|| FieldError::UnknownField {
        field: name.to_owned(),
    })?;
    validate_spec(spec, value)
}

/// 이미 조회한 카탈로그 항목으로 값을 검증합니다.
pub fn validate_spec(spec: &FieldSpec, value: &FieldValue) -> Result<FieldValue, FieldError> {
    let field = spec.name;
    match spec.kind {
        FieldKind::String { max_len } => {
            let text = value.to_string();
            let length = text.chars().count();
            if length > max_len {
                return Err(FieldError::TooLong {
                    field: field.to_owned(),
                    length,
                    max: max_len,
                });
            }
            Ok(FieldValue::Str(text))
        }
        FieldKind::Integer => as_integer(field, value).map(FieldValue::Int),
        FieldKind::Port => {
            let n = as_integer(field, value)?;
            check_range(field, n, 0, i64::from(u16::MAX))?;
            Ok(FieldValue::Int(n))
        }
        FieldKind::Severity => {
            let n = as_integer(field, value)?;
            check_range(field, n, 0, MAX_SEVERITY)?;
            Ok(FieldValue::Int(n))
        }
        FieldKind::IpAddress => {
            let text = expect_str(field, value, "IP address string")?;
            text.parse::<IpAddr>()
                .map(|_| value.clone())
                .map_err(|_| FieldError::InvalidFormat {
                    field: field.to_owned(),
                    value: text.to_owned(),
                    expected: "IP address",
                })
        }
        FieldKind::MacAddress => {
            let text = expect_str(field, value, "MAC address string")?;
            if MAC_ADDRESS.is_match(text) {
                Ok(value.clone())
            } else {
                Err(FieldError::InvalidFormat {
                    field: field.to_owned(),
                    value: text.to_owned(),
                    expected: "MAC address",
                })
            }
        }
        FieldKind::Timestamp => validate_timestamp(field, value),
        FieldKind::Enumeration(allowed) => {
            let text = value.to_string();
            allowed
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(text.trim()))
                .map(|canonical| FieldValue::Str((*canonical).to_owned()))
                .ok_or_else(|| FieldError::NotInEnumeration {
                    field: field.to_owned(),
                    value: text,
                    allowed: allowed.join(", "),
                })
        }
    }
}

fn as_integer(field: &str, value: &FieldValue) -> Result<i64, FieldError> {
    match value {
        FieldValue::Int(n) => Ok(*n),
        FieldValue::Str(text) => text.trim().parse::<i64>().map_err(|_| FieldError::WrongType {
            field: field.to_owned(),
            expected: "integer",
            value: text.clone(),
        }),
    }
}

fn expect_str<'a>(
    field: &str,
    value: &'a FieldValue,
    expected: &'static str,
) -> Result<&'a str, FieldError> {
    value.as_str().ok_or_else(|| FieldError::WrongType {
        field: field.to_owned(),
        expected,
        value: value.to_string(),
    })
}

fn check_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), FieldError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(FieldError::OutOfRange {
            field: field.to_owned(),
            value,
            min,
            max,
        })
    }
}

fn validate_timestamp(field: &str, value: &FieldValue) -> Result<FieldValue, FieldError> {
    let invalid = || FieldError::InvalidFormat {
        field: field.to_owned(),
        value: value.to_string(),
        expected: "timestamp",
    };

    match value {
        FieldValue::Int(millis) if *millis >= 0 => Ok(value.clone()),
        FieldValue::Int(_) => Err(invalid()),
        FieldValue::Str(text) => {
            let text = text.trim();
            if let Ok(millis) = text.parse::<i64>() {
                return if millis >= 0 {
                    Ok(FieldValue::Int(millis))
                } else {
                    Err(invalid())
                };
            }
            if DateTime::parse_from_rfc3339(text).is_ok()
                || NaiveDateTime::parse_from_str(text, CEF_TIMESTAMP_FORMAT).is_ok()
            {
                Ok(value.clone())
            } else {
                Err(invalid())
            }
        }
    }
}
