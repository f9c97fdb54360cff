//! syslogcef CEF 크레이트
//!
//! 보안/감사 이벤트를 Common Event Format(CEF) 한 줄로 만드는 핵심 로직입니다.
//!
//! # 모듈 구성
//!
//! - [`catalog`]: 고정 필드 카탈로그와 값 검증
//! - [`encoder`]: 필드 맵 → [`CefMessage`] → CEF 라인
//! - [`event`]: signature id 단위 [`EventDefinition`]
//! - [`sender`]: 이벤트 레지스트리, 3계층 필드 병합, 전송 위임 ([`CefSender`])

pub mod catalog;
pub mod encoder;
pub mod event;
pub mod sender;

pub use catalog::{FieldKind, FieldSpec};
pub use encoder::{CefMessage, build, encode};
pub use event::EventDefinition;
pub use sender::{CefSender, CefSenderBuilder};
