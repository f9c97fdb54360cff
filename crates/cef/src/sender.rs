//! CEF Sender -- 이벤트 레지스트리, 필드 병합, 인코딩, 전송 위임
//!
//! # 필드 병합 순서
//!
//! 아래로 갈수록 우선순위가 높습니다 (평면 병합, 나중 값이 이김).
//!
//! 1. Sender 기본 필드 (장치 vendor/product/version 포함)
//! 2. 이벤트 정의 (`signatureId`, `name`, `severity`, 추가 필드)
//! 3. 전송 호출 시 필드
//!
//! # 사용 예시
//! ```
//! use syslogcef_cef::CefSender;
//! use syslogcef_core::{DeliveryError, FieldMap, Transport};
//!
//! struct Discard;
//! impl Transport for Discard {
//!     fn name(&self) -> &str { "discard" }
//!     fn send(&self, _line: &str) -> Result<(), DeliveryError> { Ok(()) }
//! }
//!
//! let sender = CefSender::builder(Discard)
//!     .device_vendor("Github")
//!     .device_product("test-syslogcef")
//!     .device_version("14.1")
//!     .build();
//! sender.register_event("100", "Device is reachable", 1, FieldMap::new()).unwrap();
//!
//! let fields = FieldMap::new().with("message", "Ping time is: 33ms");
//! assert_eq!(
//!     sender.build_message("100", &fields).unwrap(),
//!     "CEF:0|Github|test-syslogcef|14.1|100|Device is reachable|1|msg=Ping time is: 33ms"
//! );
//! sender.send("100", &fields).unwrap();
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use syslogcef_core::config::{DeviceConfig, EventConfig};
use syslogcef_core::error::{FieldError, LookupError, SyslogCefError};
use syslogcef_core::metrics as m;
use syslogcef_core::transport::Transport;
use syslogcef_core::types::{FieldMap, FieldValue};
use tracing::{debug, warn};

use crate::encoder::{self, CefMessage};
use crate::event::EventDefinition;

/// CEF 이벤트를 인코딩하여 전송 계층으로 넘기는 Sender
///
/// 여러 스레드에서 공유할 수 있습니다. 등록은 쓰기 잠금을 마지막 삽입에만
/// 사용하고, 전송은 읽기 잠금으로 정의의 `Arc`만 복제합니다.
pub struct CefSender {
    defaults: FieldMap,
    events: RwLock<HashMap<String, Arc<EventDefinition>>>,
    transport: Box<dyn Transport>,
}

impl CefSender {
    /// 기본 필드 없이 Sender를 생성합니다.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::builder(transport).build()
    }

    /// 빌더를 생성합니다.
    pub fn builder(transport: impl Transport + 'static) -> CefSenderBuilder {
        CefSenderBuilder {
            defaults: FieldMap::new(),
            transport: Box::new(transport),
        }
    }

    /// 이벤트를 등록합니다.
    ///
    /// 호출 시 필드 없이 시험 인코딩을 수행하여 카탈로그 위반을 즉시 드러냅니다.
    /// 실패하면 레지스트리는 변경되지 않습니다. 같은 id가 이미 있으면 교체합니다.
    pub fn register_event(
        &self,
        signature_id: impl Into<String>,
        name: impl Into<String>,
        severity: u8,
        fields: FieldMap,
    ) -> Result<(), FieldError> {
        self.register(EventDefinition::new(signature_id, name, severity).with_fields(&fields))
    }

    /// 이미 만들어진 이벤트 정의를 등록합니다.
    pub fn register(&self, event: EventDefinition) -> Result<(), FieldError> {
        let mut trial = self.defaults.clone();
        trial.overlay(&event.to_fields());
        if let Err(e) = encoder::build(&trial) {
            metrics::counter!(m::SENDER_ENCODE_ERRORS_TOTAL, m::LABEL_FIELD => e.field().to_owned())
                .increment(1);
            debug!(signature_id = event.signature_id(), error = %e, "event registration rejected");
            return Err(e);
        }

        let signature_id = event.signature_id().to_owned();
        let replaced = self
            .events
            .write()
            .insert(signature_id.clone(), Arc::new(event))
            .is_some();

        metrics::counter!(m::SENDER_EVENTS_REGISTERED_TOTAL).increment(1);
        debug!(signature_id = %signature_id, replaced, "event registered");
        Ok(())
    }

    /// 설정 파일의 `[[events]]`를 모두 등록합니다. 첫 실패에서 중단합니다.
    pub fn register_all(&self, events: &[EventConfig]) -> Result<(), FieldError> {
        events
            .iter()
            .try_for_each(|config| self.register(EventDefinition::from(config)))
    }

    /// 이벤트를 인코딩하여 전송합니다.
    ///
    /// 전송 실패는 재시도하지 않고 그대로 반환합니다.
    pub fn send(&self, signature_id: &str, fields: &FieldMap) -> Result<(), SyslogCefError> {
        self.send_message(signature_id, fields).map(|_| ())
    }

    /// [`send`](Self::send)와 같지만 전송한 메시지를 돌려줍니다. 인코딩은 한 번만 합니다.
    pub fn send_message(
        &self,
        signature_id: &str,
        fields: &FieldMap,
    ) -> Result<CefMessage, SyslogCefError> {
        let message = self.build_structured(signature_id, fields)?;
        let line = message.to_string();
        if let Err(e) = self.transport.send(&line) {
            warn!(
                signature_id,
                transport = self.transport.name(),
                error = %e,
                "delivery failed"
            );
            return Err(e.into());
        }

        metrics::counter!(m::SENDER_MESSAGES_SENT_TOTAL).increment(1);
        debug!(signature_id, transport = self.transport.name(), "event sent");
        Ok(message)
    }

    /// 전송하지 않고 CEF 라인만 만듭니다.
    pub fn build_message(&self, signature_id: &str, fields: &FieldMap) -> Result<String, SyslogCefError> {
        self.build_structured(signature_id, fields)
            .map(|message| message.to_string())
    }

    /// 전송하지 않고 검증된 [`CefMessage`]를 만듭니다.
    pub fn build_structured(
        &self,
        signature_id: &str,
        fields: &FieldMap,
    ) -> Result<CefMessage, SyslogCefError> {
        let Some(event) = self.event(signature_id) else {
            metrics::counter!(m::SENDER_UNKNOWN_EVENTS_TOTAL).increment(1);
            return Err(LookupError::UnknownEvent {
                signature_id: signature_id.to_owned(),
            }
            .into());
        };

        let start = Instant::now();
        let mut merged = self.defaults.clone();
        merged.overlay(&event.to_fields());
        merged.overlay(fields);

        let message = encoder::build(&merged).inspect_err(|e| {
            metrics::counter!(m::SENDER_ENCODE_ERRORS_TOTAL, m::LABEL_FIELD => e.field().to_owned())
                .increment(1);
        })?;
        metrics::histogram!(m::SENDER_ENCODE_DURATION_SECONDS).record(start.elapsed().as_secs_f64());

        for field in message.truncated_fields() {
            metrics::counter!(m::SENDER_FIELDS_TRUNCATED_TOTAL, m::LABEL_FIELD => *field).increment(1);
            warn!(signature_id, field = *field, "field value truncated");
        }
        Ok(message)
    }

    /// 등록된 signature id 목록 (정렬됨)
    pub fn registered_events(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.events.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// 등록된 이벤트 정의를 반환합니다.
    pub fn event(&self, signature_id: &str) -> Option<Arc<EventDefinition>> {
        self.events.read().get(signature_id).cloned()
    }

    pub fn is_registered(&self, signature_id: &str) -> bool {
        self.events.read().contains_key(signature_id)
    }

    /// Sender 기본 필드
    pub fn defaults(&self) -> &FieldMap {
        &self.defaults
    }

    /// 전송 계층 이름
    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }
}

/// [`CefSender`] 빌더
pub struct CefSenderBuilder {
    defaults: FieldMap,
    transport: Box<dyn Transport>,
}

impl CefSenderBuilder {
    pub fn device_vendor(self, vendor: impl Into<String>) -> Self {
        self.field("deviceVendor", vendor.into())
    }

    pub fn device_product(self, product: impl Into<String>) -> Self {
        self.field("deviceProduct", product.into())
    }

    pub fn device_version(self, version: impl Into<String>) -> Self {
        self.field("deviceVersion", version.into())
    }

    /// 설정 파일의 `[device]` 섹션을 적용합니다. 빈 항목은 기본값을 유지합니다.
    pub fn device(mut self, device: &DeviceConfig) -> Self {
        if let Some(vendor) = &device.vendor {
            self = self.device_vendor(vendor);
        }
        if let Some(product) = &device.product {
            self = self.device_product(product);
        }
        if let Some(version) = &device.version {
            self = self.device_version(version);
        }
        self
    }

    /// 기본 필드를 추가합니다. 카탈로그 검증은 인코딩 시점에 수행됩니다.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.defaults.insert(key, value);
        self
    }

    /// 기본 필드를 덮어씁니다.
    pub fn fields(mut self, fields: &FieldMap) -> Self {
        self.defaults.overlay(fields);
        self
    }

    pub fn build(self) -> CefSender {
        CefSender {
            defaults: self.defaults,
            events: RwLock::new(HashMap::new()),
            transport: self.transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syslogcef_core::error::DeliveryError;

    #[derive(Default)]
    struct Capture {
        lines: parking_lot::Mutex<Vec<String>>,
    }

    impl Transport for Capture {
        fn name(&self) -> &str {
            "capture"
        }

        fn send(&self, line: &str) -> Result<(), DeliveryError> {
            self.lines.lock().push(line.to_owned());
            Ok(())
        }
    }

    struct Broken;

    impl Transport for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn send(&self, _line: &str) -> Result<(), DeliveryError> {
            Err(DeliveryError::Write {
                transport: "broken".to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"),
            })
        }
    }

    fn capture_sender() -> (Arc<Capture>, CefSender) {
        let capture = Arc::new(Capture::default());
        let sender = CefSender::new(Arc::clone(&capture));
        (capture, sender)
    }

    #[test]
    fn send_hands_line_to_transport() {
        let (capture, sender) = capture_sender();
        sender
            .register_event("100", "Device is reachable", 1, FieldMap::new())
            .unwrap();
        sender
            .send("100", &FieldMap::new().with("message", "Ping time is: 33ms"))
            .unwrap();

        assert_eq!(
            capture.lines.lock().as_slice(),
            ["CEF:0|CEF Vendor|CEF Product|1.0|100|Device is reachable|1|msg=Ping time is: 33ms"]
        );
    }

    #[test]
    fn send_message_returns_the_delivered_line() {
        let (capture, sender) = capture_sender();
        sender
            .register_event("100", "Device is reachable", 1, FieldMap::new())
            .unwrap();
        let message = sender
            .send_message("100", &FieldMap::new().with("message", "x".repeat(2000)))
            .unwrap();

        assert_eq!(message.truncated_fields(), ["message"]);
        let lines = capture.lines.lock();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], message.to_string());
    }

    #[test]
    fn unknown_event_is_lookup_error() {
        let (capture, sender) = capture_sender();
        let err = sender.send("404", &FieldMap::new()).unwrap_err();
        assert!(matches!(
            err,
            SyslogCefError::Lookup(LookupError::UnknownEvent { ref signature_id }) if signature_id == "404"
        ));
        assert!(capture.lines.lock().is_empty());
    }

    #[test]
    fn failed_registration_leaves_registry_unchanged() {
        let (_, sender) = capture_sender();
        sender
            .register_event("200", "Original", 2, FieldMap::new())
            .unwrap();

        let err = sender
            .register_event("200", "Replacement", 3, FieldMap::from([("sourcePort", "http")]))
            .unwrap_err();
        assert!(matches!(err, FieldError::WrongType { .. }));
        assert_eq!(sender.event("200").unwrap().name(), "Original");
    }

    #[test]
    fn reregistration_overwrites() {
        let (_, sender) = capture_sender();
        sender.register_event("1", "first", 1, FieldMap::new()).unwrap();
        sender.register_event("1", "second", 2, FieldMap::new()).unwrap();
        assert_eq!(sender.registered_events(), vec!["1".to_owned()]);
        assert_eq!(
            sender.build_message("1", &FieldMap::new()).unwrap(),
            "CEF:0|CEF Vendor|CEF Product|1.0|1|second|2|"
        );
    }

    #[test]
    fn invalid_default_fields_surface_at_registration() {
        let sender = CefSender::builder(Capture::default())
            .field("deviceAddress", "not-an-ip")
            .build();
        let err = sender
            .register_event("1", "x", 1, FieldMap::new())
            .unwrap_err();
        assert_eq!(err.field(), "deviceAddress");
        assert!(!sender.is_registered("1"));
    }

    #[test]
    fn call_fields_can_override_event_header() {
        let (_, sender) = capture_sender();
        sender.register_event("1", "name", 1, FieldMap::new()).unwrap();
        let line = sender
            .build_message("1", &FieldMap::new().with("severity", 7).with("name", "override"))
            .unwrap();
        assert_eq!(line, "CEF:0|CEF Vendor|CEF Product|1.0|1|override|7|");
    }

    #[test]
    fn invalid_call_fields_fail_without_sending() {
        let (capture, sender) = capture_sender();
        sender.register_event("1", "name", 1, FieldMap::new()).unwrap();
        let err = sender
            .send("1", &FieldMap::new().with("transportProtocol", "HTTP"))
            .unwrap_err();
        assert!(matches!(
            err,
            SyslogCefError::Field(FieldError::NotInEnumeration { .. })
        ));
        assert!(capture.lines.lock().is_empty());
    }

    #[test]
    fn delivery_error_propagates() {
        let sender = CefSender::new(Broken);
        sender.register_event("1", "x", 1, FieldMap::new()).unwrap();
        let err = sender.send("1", &FieldMap::new()).unwrap_err();
        assert!(matches!(err, SyslogCefError::Delivery(_)));
    }

    #[test]
    fn builder_applies_device_config() {
        let device = DeviceConfig {
            vendor: Some("syslogcef".to_owned()),
            product: None,
            version: Some("0.1.0".to_owned()),
        };
        let sender = CefSender::builder(Capture::default()).device(&device).build();
        assert_eq!(
            sender.defaults().get("deviceVendor"),
            Some(&FieldValue::from("syslogcef"))
        );
        assert!(!sender.defaults().contains_key("deviceProduct"));
        assert_eq!(sender.transport_name(), "capture");
    }

    #[test]
    fn register_all_stops_at_first_invalid_event() {
        let (_, sender) = capture_sender();
        let events = vec![
            EventConfig {
                signature_id: "ok".to_owned(),
                name: "ok".to_owned(),
                severity: 1,
                fields: FieldMap::new(),
            },
            EventConfig {
                signature_id: "bad".to_owned(),
                name: "bad".to_owned(),
                severity: 42,
                fields: FieldMap::new(),
            },
        ];
        let err = sender.register_all(&events).unwrap_err();
        assert_eq!(err.field(), "severity");
        assert_eq!(sender.registered_events(), vec!["ok".to_owned()]);
    }
}
