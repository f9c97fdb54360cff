//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `syslogcef_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 전송 계층 레이블 키 (syslog-tcp, syslog-udp, stdout, composite)
pub const LABEL_TRANSPORT: &str = "transport";

/// 필드 이름 레이블 키
pub const LABEL_FIELD: &str = "field";

// ─── Sender 메트릭 ─────────────────────────────────────────────────

/// Sender: 등록된 이벤트 정의 수 (counter)
pub const SENDER_EVENTS_REGISTERED_TOTAL: &str = "syslogcef_sender_events_registered_total";

/// Sender: 전송 계층에 넘겨진 메시지 수 (counter)
pub const SENDER_MESSAGES_SENT_TOTAL: &str = "syslogcef_sender_messages_sent_total";

/// Sender: 필드 검증 실패 수 (counter, label: field)
pub const SENDER_ENCODE_ERRORS_TOTAL: &str = "syslogcef_sender_encode_errors_total";

/// Sender: 등록되지 않은 이벤트 조회 수 (counter)
pub const SENDER_UNKNOWN_EVENTS_TOTAL: &str = "syslogcef_sender_unknown_events_total";

/// Sender: 길이 초과로 잘린 문자열 필드 수 (counter, label: field)
pub const SENDER_FIELDS_TRUNCATED_TOTAL: &str = "syslogcef_sender_fields_truncated_total";

/// Sender: 인코딩 소요 시간 (histogram, 초)
pub const SENDER_ENCODE_DURATION_SECONDS: &str = "syslogcef_sender_encode_duration_seconds";

// ─── Transport 메트릭 ──────────────────────────────────────────────

/// Transport: 기록된 바이트 수 (counter, label: transport)
pub const TRANSPORT_BYTES_WRITTEN_TOTAL: &str = "syslogcef_transport_bytes_written_total";

/// Transport: 전송 실패 수 (counter, label: transport)
pub const TRANSPORT_DELIVERY_ERRORS_TOTAL: &str = "syslogcef_transport_delivery_errors_total";

/// Transport: TCP 재연결 수 (counter, label: transport)
pub const TRANSPORT_RECONNECTS_TOTAL: &str = "syslogcef_transport_reconnects_total";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더가 없으면 아무 일도 하지 않습니다. 시작 시 한 번 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        SENDER_EVENTS_REGISTERED_TOTAL,
        "Total number of event definitions registered"
    );
    describe_counter!(
        SENDER_MESSAGES_SENT_TOTAL,
        "Total number of CEF lines handed to a transport"
    );
    describe_counter!(
        SENDER_ENCODE_ERRORS_TOTAL,
        "Total number of field catalog violations during encoding"
    );
    describe_counter!(
        SENDER_UNKNOWN_EVENTS_TOTAL,
        "Total number of sends referencing an unregistered signature id"
    );
    describe_counter!(
        SENDER_FIELDS_TRUNCATED_TOTAL,
        "Total number of string fields silently truncated to fit the catalog"
    );
    describe_histogram!(
        SENDER_ENCODE_DURATION_SECONDS,
        "Time to merge and encode a single CEF line in seconds"
    );
    describe_counter!(
        TRANSPORT_BYTES_WRITTEN_TOTAL,
        "Total bytes written to syslog sockets and stdout"
    );
    describe_counter!(
        TRANSPORT_DELIVERY_ERRORS_TOTAL,
        "Total number of failed deliveries"
    );
    describe_counter!(
        TRANSPORT_RECONNECTS_TOTAL,
        "Total number of TCP reconnects after a broken connection"
    );
}
