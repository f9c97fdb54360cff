//! CEF 인코더 -- 병합된 필드 맵을 검증하여 한 줄의 CEF 메시지로 직렬화
//!
//! 입력 맵에는 헤더 필드(`deviceVendor`, `deviceProduct`, `deviceVersion`,
//! `signatureId`, `name`, `severity`)와 익스텐션 필드가 함께 들어 있습니다.
//! 헤더 필드는 파이프로 구분된 헤더로, 나머지는 삽입 순서대로
//! `key=value` 익스텐션으로 출력됩니다.
//!
//! # 잘라내기 규칙
//!
//! 값이 문자열이고 검증에 실패하면 [`TRUNCATE_LEN`] 글자로 잘라 한 번 더 검증합니다.
//! 재검증에 성공하면 에러 없이 잘린 값을 사용하고, 실패하면 재검증 에러를 반환합니다.
//! 문자열이 아닌 값의 검증 실패는 그대로 반환됩니다.
//!
//! 인코더는 순수 함수이며 부수 효과가 없습니다. 잘린 필드 목록은
//! [`CefMessage::truncated_fields`]로 호출자에게 전달됩니다.

use std::fmt;

use syslogcef_core::error::FieldError;
use syslogcef_core::types::{FieldMap, FieldValue};

use crate::catalog::{self, Placement};

/// CEF 포맷 버전
pub const CEF_VERSION: u8 = 0;

/// `deviceVendor` 기본값
pub const DEFAULT_DEVICE_VENDOR: &str = "CEF Vendor";

/// `deviceProduct` 기본값
pub const DEFAULT_DEVICE_PRODUCT: &str = "CEF Product";

/// `deviceVersion` 기본값
pub const DEFAULT_DEVICE_VERSION: &str = "1.0";

/// 길이 초과 문자열을 잘라낼 글자 수
pub const TRUNCATE_LEN: usize = 1022;

/// 검증을 마친 CEF 메시지
///
/// [`fmt::Display`]가 정규 라인 형식을 출력합니다. 개행 문자는 붙지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CefMessage {
    device_vendor: String,
    device_product: String,
    device_version: String,
    signature_id: String,
    name: String,
    severity: u8,
    extensions: Vec<(&'static str, String)>,
    truncated: Vec<&'static str>,
}

impl CefMessage {
    pub fn device_vendor(&self) -> &str {
        &self.device_vendor
    }

    pub fn device_product(&self) -> &str {
        &self.device_product
    }

    pub fn device_version(&self) -> &str {
        &self.device_version
    }

    pub fn signature_id(&self) -> &str {
        &self.signature_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn severity(&self) -> u8 {
        self.severity
    }

    /// 익스텐션 키(약어)로 값을 찾습니다. 반환 값은 이스케이프 전 원문입니다.
    pub fn extension(&self, key: &str) -> Option<&str> {
        self.extensions
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 익스텐션 쌍을 출력 순서대로 순회합니다.
    pub fn extensions(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.extensions.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// 인코딩 중 잘린 필드 이름 목록
    pub fn truncated_fields(&self) -> &[&'static str] {
        &self.truncated
    }
}

impl fmt::Display for CefMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CEF:{}|{}|{}|{}|{}|{}|{}|",
            CEF_VERSION,
            escape_header(&self.device_vendor),
            escape_header(&self.device_product),
            escape_header(&self.device_version),
            escape_header(&self.signature_id),
            escape_header(&self.name),
            self.severity,
        )?;
        for (i, (key, value)) in self.extensions.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={}", escape_extension(value))?;
        }
        Ok(())
    }
}

/// 필드 맵을 검증하여 [`CefMessage`]를 만듭니다.
///
/// `signatureId`, `name`, `severity`가 없으면 [`FieldError::MissingField`]를 반환합니다.
/// 장치 필드가 없으면 기본값(`CEF Vendor`, `CEF Product`, `1.0`)을 사용합니다.
pub fn build(fields: &FieldMap) -> Result<CefMessage, FieldError> {
    let mut header = HeaderSlots::default();
    let mut extensions = Vec::new();
    let mut truncated = Vec::new();

    for (name, value) in fields.iter() {
        let spec = catalog::lookup(name).ok_or_else(|| FieldError::UnknownField {
            field: name.to_owned(),
        })?;
        let (value, was_truncated) = validate_with_truncation(spec, value)?;
        if was_truncated {
            truncated.push(spec.name);
        }

        match spec.placement {
            Placement::Header => header.set(spec.name, value),
            Placement::Extension(key) => extensions.push((key, value.to_string())),
        }
    }

    let severity = header.required_severity()?;
    Ok(CefMessage {
        device_vendor: header.vendor.unwrap_or_else(|| DEFAULT_DEVICE_VENDOR.to_owned()),
        device_product: header.product.unwrap_or_else(|| DEFAULT_DEVICE_PRODUCT.to_owned()),
        device_version: header.version.unwrap_or_else(|| DEFAULT_DEVICE_VERSION.to_owned()),
        signature_id: required(header.signature_id, "signatureId")?,
        name: required(header.name, "name")?,
        severity,
        extensions,
        truncated,
    })
}

/// 필드 맵을 검증하여 CEF 라인 문자열을 반환합니다.
pub fn encode(fields: &FieldMap) -> Result<String, FieldError> {
    build(fields).map(|message| message.to_string())
}

fn validate_with_truncation(
    spec: &catalog::FieldSpec,
    value: &FieldValue,
) -> Result<(FieldValue, bool), FieldError> {
    let err = match catalog::validate_spec(spec, value) {
        Ok(validated) => return Ok((validated, false)),
        Err(err) => err,
    };

    let FieldValue::Str(text) = value else {
        return Err(err);
    };
    let Some((cut, _)) = text.char_indices().nth(TRUNCATE_LEN) else {
        // 잘라낼 것이 없으면 재검증 결과도 같다
        return Err(err);
    };

    let shortened = FieldValue::Str(text[..cut].to_owned());
    catalog::validate_spec(spec, &shortened).map(|validated| (validated, true))
}

#[derive(Default)]
struct HeaderSlots {
    vendor: Option<String>,
    product: Option<String>,
    version: Option<String>,
    signature_id: Option<String>,
    name: Option<String>,
    severity: Option<FieldValue>,
}

impl HeaderSlots {
    fn set(&mut self, field: &str, value: FieldValue) {
        match field {
            "deviceVendor" => self.vendor = Some(value.to_string()),
            "deviceProduct" => self.product = Some(value.to_string()),
            "deviceVersion" => self.version = Some(value.to_string()),
            "signatureId" => self.signature_id = Some(value.to_string()),
            "name" => self.name = Some(value.to_string()),
            "severity" => self.severity = Some(value),
            _ => {}
        }
    }

    fn required_severity(&self) -> Result<u8, FieldError> {
        let value = self
            .severity
            .as_ref()
            .ok_or_else(|| FieldError::MissingField {
                field: "severity".to_owned(),
            })?;
        // 카탈로그가 0..=10 범위의 정수로 정규화한다
        value
            .as_int()
            .and_then(|n| u8::try_from(n).ok())
            .ok_or_else(|| FieldError::WrongType {
                field: "severity".to_owned(),
                expected: "integer",
                value: value.to_string(),
            })
    }
}

fn required(slot: Option<String>, field: &str) -> Result<String, FieldError> {
    slot.ok_or_else(|| FieldError::MissingField {
        field: field.to_owned(),
    })
}

/// 헤더 값 이스케이프 (`\`, `|`, 개행)
pub fn escape_header(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '|' => result.push_str("\\|"),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            _ => result.push(c),
        }
    }
    result
}

/// 익스텐션 값 이스케이프 (`\`, `=`, 개행)
pub fn escape_extension(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '=' => result.push_str("\\="),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            _ => result.push(c),
        }
    }
    result
}
