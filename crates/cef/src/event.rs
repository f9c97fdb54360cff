//! 이벤트 정의 -- signature id 단위로 등록되는 CEF 이벤트 템플릿

use syslogcef_core::config::EventConfig;
use syslogcef_core::types::{FieldMap, FieldValue};

/// 등록된 이벤트 정의
///
/// 생성 후에는 변경할 수 없습니다. 같은 signature id로 다시 등록하면
/// Sender 레지스트리에서 새 정의로 교체됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDefinition {
    signature_id: String,
    name: String,
    severity: u8,
    fields: FieldMap,
}

impl EventDefinition {
    /// 추가 필드 없이 이벤트 정의를 생성합니다.
    ///
    /// `severity` 범위(0-10)는 등록 시 시험 인코딩에서 검증됩니다.
    pub fn new(signature_id: impl Into<String>, name: impl Into<String>, severity: u8) -> Self {
        Self {
            signature_id: signature_id.into(),
            name: name.into(),
            severity,
            fields: FieldMap::new(),
        }
    }

    /// 추가 필드를 하나 붙입니다.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key, value);
        self
    }

    /// 추가 필드를 덮어씁니다.
    pub fn with_fields(mut self, fields: &FieldMap) -> Self {
        self.fields.overlay(fields);
        self
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

    /// 이벤트 고유 추가 필드
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// 병합의 중간 계층: `signatureId`, `name`, `severity` 뒤에 추가 필드
    pub fn to_fields(&self) -> FieldMap {
        let mut layer = FieldMap::new()
            .with("signatureId", self.signature_id.as_str())
            .with("name", self.name.as_str())
            .with("severity", self.severity);
        layer.overlay(&self.fields);
        layer
    }
}

impl From<&EventConfig> for EventDefinition {
    fn from(config: &EventConfig) -> Self {
        Self::new(&config.signature_id, &config.name, config.severity).with_fields(&config.fields)
    }
}
