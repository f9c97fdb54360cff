//! syslog 메시지 프레이밍
//!
//! CEF 라인을 syslog 헤더로 감싸고(RFC 5424 또는 RFC 3164),
//! TCP로 보낼 때는 newline 또는 octet-counting(RFC 6587) 방식으로 구분합니다.
//!
//! # RFC 5424
//! ```text
//! <PRI>1 TIMESTAMP HOSTNAME APP-NAME PROCID MSGID SD [BOM]MSG
//! <14>1 2024-01-15T12:00:00.000000Z web01 syslogcef 4242 - - CEF:0|...
//! ```
//!
//! # RFC 3164
//! ```text
//! <PRI>Mmm dd hh:mm:ss HOSTNAME TAG[PID]: MSG
//! <14>Jan 15 12:00:00 web01 syslogcef[4242]: CEF:0|...
//! ```

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use syslogcef_core::config::{VALID_FACILITIES, VALID_SYSLOG_FORMATS, VALID_TCP_FRAMINGS};
use syslogcef_core::error::ConfigError;

/// 모든 메시지는 informational 심각도로 보냅니다.
pub const SEVERITY_INFORMATIONAL: u8 = 6;

/// NILVALUE
const NIL: &str = "-";

/// RFC 5424 HOSTNAME 최대 길이
const MAX_HOSTNAME_LEN: usize = 255;

/// RFC 5424 APP-NAME 최대 길이
const MAX_APP_NAME_LEN: usize = 48;

/// RFC 3164 TAG 최대 길이
const MAX_TAG_LEN: usize = 32;

/// UTF-8 BOM
const BOM: char = '\u{FEFF}';

/// syslog 메시지 형식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyslogFormat {
    /// RFC 5424 (기본값)
    #[default]
    Rfc5424,
    /// RFC 3164 (BSD syslog)
    Rfc3164,
}

impl FromStr for SyslogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rfc5424" => Ok(Self::Rfc5424),
            "rfc3164" => Ok(Self::Rfc3164),
            _ => Err(ConfigError::InvalidValue {
                field: "format".to_owned(),
                reason: format!("'{s}' must be one of: {}", VALID_SYSLOG_FORMATS.join(", ")),
            }),
        }
    }
}

/// syslog facility (RFC 5424 코드 0-23)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Facility {
    Kern = 0,
    #[default]
    User = 1,
    Mail = 2,
    Daemon = 3,
    Auth = 4,
    Syslog = 5,
    Lpr = 6,
    News = 7,
    Uucp = 8,
    Cron = 9,
    Authpriv = 10,
    Ftp = 11,
    Ntp = 12,
    Audit = 13,
    Alert = 14,
    Clock = 15,
    Local0 = 16,
    Local1 = 17,
    Local2 = 18,
    Local3 = 19,
    Local4 = 20,
    Local5 = 21,
    Local6 = 22,
    Local7 = 23,
}

impl Facility {
    const ALL: [Facility; 24] = [
        Self::Kern,
        Self::User,
        Self::Mail,
        Self::Daemon,
        Self::Auth,
        Self::Syslog,
        Self::Lpr,
        Self::News,
        Self::Uucp,
        Self::Cron,
        Self::Authpriv,
        Self::Ftp,
        Self::Ntp,
        Self::Audit,
        Self::Alert,
        Self::Clock,
        Self::Local0,
        Self::Local1,
        Self::Local2,
        Self::Local3,
        Self::Local4,
        Self::Local5,
        Self::Local6,
        Self::Local7,
    ];

    /// 숫자 facility 코드 (0-23)
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl FromStr for Facility {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_ascii_lowercase();
        VALID_FACILITIES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|idx| Self::ALL[idx])
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "facility".to_owned(),
                reason: format!("'{s}' must be one of: {}", VALID_FACILITIES.join(", ")),
            })
    }
}

/// TCP 메시지 구분 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TcpFraming {
    /// Octet-counting (RFC 6587): `LEN SP MSG`
    OctetCounting,
    /// 개행 문자로 메시지 구분 (기본값, 호환성 높음)
    #[default]
    NewlineDelimited,
}

impl TcpFraming {
    /// TCP 스트림에 쓸 바이트를 만듭니다.
    pub fn frame(self, message: &str) -> Vec<u8> {
        match self {
            Self::NewlineDelimited => {
                let mut out = Vec::with_capacity(message.len() + 1);
                out.extend_from_slice(message.as_bytes());
                out.push(b'\n');
                out
            }
            Self::OctetCounting => format!("{} {message}", message.len()).into_bytes(),
        }
    }
}

impl FromStr for TcpFraming {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newline" => Ok(Self::NewlineDelimited),
            "octet-counting" => Ok(Self::OctetCounting),
            _ => Err(ConfigError::InvalidValue {
                field: "tcp_framing".to_owned(),
                reason: format!("'{s}' must be one of: {}", VALID_TCP_FRAMINGS.join(", ")),
            }),
        }
    }
}

/// syslog 헤더 생성기
///
/// 생성 시 HOSTNAME과 APP-NAME을 정리해 두고, 메시지마다 타임스탬프만 새로 붙입니다.
#[derive(Debug, Clone)]
pub struct SyslogHeader {
    format: SyslogFormat,
    facility: Facility,
    hostname: String,
    app_name: String,
    procid: u32,
    include_bom: bool,
}

impl SyslogHeader {
    pub fn new(
        format: SyslogFormat,
        facility: Facility,
        hostname: &str,
        app_name: &str,
        include_bom: bool,
    ) -> Self {
        let app_limit = match format {
            SyslogFormat::Rfc5424 => MAX_APP_NAME_LEN,
            SyslogFormat::Rfc3164 => MAX_TAG_LEN,
        };
        Self {
            format,
            facility,
            hostname: sanitize_header_field(hostname, MAX_HOSTNAME_LEN),
            app_name: sanitize_header_field(app_name, app_limit),
            procid: std::process::id(),
            include_bom,
        }
    }

    /// PROCID를 고정합니다.
    pub fn with_procid(mut self, procid: u32) -> Self {
        self.procid = procid;
        self
    }

    /// PRI 값: facility * 8 + severity
    pub fn pri(&self) -> u16 {
        u16::from(self.facility.code()) * 8 + u16::from(SEVERITY_INFORMATIONAL)
    }

    pub fn format(&self) -> SyslogFormat {
        self.format
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// 메시지 앞에 syslog 헤더를 붙입니다. 개행이나 TCP 프레이밍은 붙이지 않습니다.
    pub fn wrap(&self, message: &str, now: DateTime<Utc>) -> String {
        let mut out = String::with_capacity(message.len() + 96);
        match self.format {
            SyslogFormat::Rfc5424 => {
                let _ = write!(
                    out,
                    "<{}>1 {} {} {} {} {NIL} {NIL} ",
                    self.pri(),
                    now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                    self.hostname,
                    self.app_name,
                    self.procid,
                );
                if self.include_bom {
                    out.push(BOM);
                }
            }
            SyslogFormat::Rfc3164 => {
                let _ = write!(
                    out,
                    "<{}>{} {} {}[{}]: ",
                    self.pri(),
                    now.format("%b %e %H:%M:%S"),
                    self.hostname,
                    self.app_name,
                    self.procid,
                );
            }
        }
        out.push_str(message);
        out
    }
}

/// syslog 헤더 필드 정리
///
/// 공백을 제외한 출력 가능한 ASCII(33-126)만 남기고 최대 길이로 자릅니다.
/// 결과가 비면 NILVALUE(`-`)를 사용합니다.
pub fn sanitize_header_field(s: &str, max_len: usize) -> String {
    let sanitized: String = s
        .chars()
        .filter(|c| ('\x21'..='\x7e').contains(c))
        .take(max_len)
        .collect();

    if sanitized.is_empty() {
        NIL.to_owned()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 5, 9, 3, 7).unwrap()
    }

    #[test]
    fn rfc5424_header_with_bom() {
        let header = SyslogHeader::new(SyslogFormat::Rfc5424, Facility::User, "web01", "syslogcef", true)
            .with_procid(4242);
        assert_eq!(
            header.wrap("CEF:0|a", fixed_time()),
            "<14>1 2024-01-05T09:03:07.000000Z web01 syslogcef 4242 - - \u{FEFF}CEF:0|a"
        );
    }

    #[test]
    fn rfc5424_header_without_bom() {
        let header = SyslogHeader::new(SyslogFormat::Rfc5424, Facility::Local0, "web01", "app", false)
            .with_procid(1);
        assert_eq!(
            header.wrap("CEF:0|a", fixed_time()),
            "<134>1 2024-01-05T09:03:07.000000Z web01 app 1 - - CEF:0|a"
        );
    }

    #[test]
    fn rfc3164_header() {
        let header = SyslogHeader::new(SyslogFormat::Rfc3164, Facility::Auth, "web01", "syslogcef", true)
            .with_procid(77);
        assert_eq!(
            header.wrap("CEF:0|a", fixed_time()),
            "<38>Jan  5 09:03:07 web01 syslogcef[77]: CEF:0|a"
        );
    }

    #[test]
    fn header_fields_are_sanitized() {
        let header = SyslogHeader::new(
            SyslogFormat::Rfc5424,
            Facility::User,
            "my host",
            &"a".repeat(100),
            false,
        );
        assert_eq!(header.hostname(), "myhost");
        assert_eq!(header.app_name().len(), MAX_APP_NAME_LEN);

        let header = SyslogHeader::new(SyslogFormat::Rfc3164, Facility::User, "", "x y", false);
        assert_eq!(header.hostname(), "-");
        assert_eq!(header.app_name(), "xy");
    }

    #[test]
    fn pri_calculation() {
        for (facility, expected) in [
            (Facility::Kern, 6),
            (Facility::User, 14),
            (Facility::Local7, 190),
        ] {
            let header = SyslogHeader::new(SyslogFormat::Rfc5424, facility, "h", "a", false);
            assert_eq!(header.pri(), expected);
        }
    }

    #[test]
    fn facility_from_str() {
        assert_eq!("user".parse::<Facility>().unwrap(), Facility::User);
        assert_eq!("LOCAL3".parse::<Facility>().unwrap().code(), 19);
        assert!("nope".parse::<Facility>().is_err());
        for (idx, name) in VALID_FACILITIES.iter().enumerate() {
            assert_eq!(name.parse::<Facility>().unwrap().code() as usize, idx);
        }
    }

    #[test]
    fn format_and_framing_from_str() {
        assert_eq!("RFC3164".parse::<SyslogFormat>().unwrap(), SyslogFormat::Rfc3164);
        assert!("json".parse::<SyslogFormat>().is_err());
        assert_eq!(
            "octet-counting".parse::<TcpFraming>().unwrap(),
            TcpFraming::OctetCounting
        );
        assert!("crlf".parse::<TcpFraming>().is_err());
    }

    #[test]
    fn tcp_framing() {
        assert_eq!(TcpFraming::NewlineDelimited.frame("abc"), b"abc\n");
        assert_eq!(TcpFraming::OctetCounting.frame("abc"), b"3 abc");
        // 바이트 길이 기준
        assert_eq!(TcpFraming::OctetCounting.frame("é"), "2 é".as_bytes());
    }

    // proptest 기반 속성 테스트
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn octet_counting_prefix_matches_byte_length(msg in "\\PC{0,300}") {
                let framed = TcpFraming::OctetCounting.frame(&msg);
                let framed = String::from_utf8(framed).unwrap();
                let (len, body) = framed.split_once(' ').unwrap();
                prop_assert_eq!(len.parse::<usize>().unwrap(), msg.len());
                prop_assert_eq!(body, msg.as_str());
            }

            #[test]
            fn sanitized_field_is_printable_ascii(s in "\\PC{0,100}", max in 1usize..64) {
                let field = sanitize_header_field(&s, max);
                prop_assert!(!field.is_empty());
                prop_assert!(field.chars().count() <= max);
                prop_assert!(field.chars().all(|c| ('\x21'..='\x7e').contains(&c)));
            }

            #[test]
            fn pri_for_every_facility(idx in 0usize..24) {
                let facility = Facility::ALL[idx];
                let header = SyslogHeader::new(SyslogFormat::Rfc5424, facility, "h", "a", false);
                prop_assert_eq!(header.pri(), u16::from(facility.code()) * 8 + 6);
            }
        }
    }
}
