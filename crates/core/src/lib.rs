//! syslogcef 공통 크레이트
//!
//! CEF 인코더(`syslogcef-cef`)와 전송 계층(`syslogcef-transport`)이 공유하는
//! 타입, trait, 에러, 설정을 정의합니다.
//!
//! # 모듈 구성
//!
//! - [`error`]: 에러 taxonomy (필드, 설정, 조회, 전송)
//! - [`types`]: [`FieldValue`], 순서 보존 [`FieldMap`]
//! - [`transport`]: [`Transport`] trait
//! - [`config`]: `syslogcef.toml` 설정
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod transport;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, DeliveryError, FieldError, LookupError, SyslogCefError};

// 설정
pub use config::SyslogCefConfig;

// 전송 trait
pub use transport::Transport;

// 도메인 타입
pub use types::{FieldMap, FieldValue};
