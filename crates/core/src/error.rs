//! 에러 타입 -- 도메인별 에러 정의
//!
//! [`SyslogCefError`]는 최상위 에러이며, 각 하위 에러는 `#[from]` 변환을 통해
//! `?` 연산자로 자연스럽게 전파됩니다.
//!
//! | 하위 에러 | 발생 지점 |
//! |-----------|-----------|
//! | [`FieldError`] | 이벤트 등록 시 시험 인코딩, 전송 시 인코딩 |
//! | [`ConfigError`] | 설정 파일 로딩, 전송 계층 생성 |
//! | [`LookupError`] | 등록되지 않은 signature id로 전송 |
//! | [`DeliveryError`] | 소켓 연결/쓰기 실패 |

/// syslogcef 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SyslogCefError {
    /// 필드 카탈로그 검증 실패
    #[error("field error: {0}")]
    Field(#[from] FieldError),

    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 이벤트 조회 실패
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// 전송 실패
    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 필드 카탈로그 검증 에러
///
/// 모든 variant는 문제가 된 필드 이름을 포함합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// 카탈로그에 없는 필드
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// 필수 헤더 필드 누락
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// 값 타입 불일치
    #[error("field '{field}': expected {expected}, got '{value}'")]
    WrongType {
        field: String,
        expected: &'static str,
        value: String,
    },

    /// 허용 범위 초과
    #[error("field '{field}': {value} is out of range ({min}..={max})")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// 열거형 값이 아님
    #[error("field '{field}': '{value}' is not one of: {allowed}")]
    NotInEnumeration {
        field: String,
        value: String,
        allowed: String,
    },

    /// 형식 불일치 (IP, MAC, 타임스탬프 등)
    #[error("field '{field}': '{value}' is not a valid {expected}")]
    InvalidFormat {
        field: String,
        value: String,
        expected: &'static str,
    },

    /// 최대 길이 초과
    #[error("field '{field}': length {length} exceeds maximum {max}")]
    TooLong {
        field: String,
        length: usize,
        max: usize,
    },
}

impl FieldError {
    /// 문제가 된 필드 이름을 반환합니다.
    pub fn field(&self) -> &str {
        match self {
            Self::UnknownField { field }
            | Self::MissingField { field }
            | Self::WrongType { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NotInEnumeration { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::TooLong { field, .. } => field,
        }
    }
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// 지원하지 않는 전송 프로토콜
    #[error("invalid protocol '{protocol}', expected 'TCP' or 'UDP'")]
    UnsupportedProtocol { protocol: String },
}

/// 이벤트 조회 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// 등록되지 않은 이벤트
    #[error("event '{signature_id}' is not registered")]
    UnknownEvent { signature_id: String },
}

/// 전송 계층 에러
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// 호스트 주소 해석 실패
    #[error("failed to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// 연결 실패
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// 쓰기 실패
    #[error("{transport}: write failed: {source}")]
    Write {
        transport: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_exposes_field_name() {
        let err = FieldError::OutOfRange {
            field: "sourcePort".to_owned(),
            value: 70000,
            min: 0,
            max: 65535,
        };
        assert_eq!(err.field(), "sourcePort");
        let msg = err.to_string();
        assert!(msg.contains("70000"));
        assert!(msg.contains("65535"));
    }

    #[test]
    fn field_error_converts_to_top_level() {
        let err: SyslogCefError = FieldError::UnknownField {
            field: "host".to_owned(),
        }
        .into();
        assert!(matches!(err, SyslogCefError::Field(_)));
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn unsupported_protocol_display() {
        let err = ConfigError::UnsupportedProtocol {
            protocol: "HTTP".to_owned(),
        };
        assert!(err.to_string().contains("HTTP"));
        assert!(err.to_string().contains("TCP"));
    }

    #[test]
    fn delivery_error_keeps_io_source() {
        use std::error::Error;

        let err = DeliveryError::Write {
            transport: "syslog-tcp".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("syslog-tcp"));
    }

    #[test]
    fn lookup_error_display() {
        let err = LookupError::UnknownEvent {
            signature_id: "100".to_owned(),
        };
        assert_eq!(err.to_string(), "event '100' is not registered");
    }
}
