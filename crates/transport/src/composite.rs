//! 팬아웃 전송 계층
//!
//! 감싼 전송 계층 모두에 같은 라인을 등록 순서대로 보냅니다.
//! 하나가 실패해도 나머지에는 계속 보내며, 모두 시도한 뒤 첫 번째 에러를 반환합니다.

use syslogcef_core::error::DeliveryError;
use syslogcef_core::transport::Transport;
use tracing::warn;

const NAME: &str = "composite";

#[derive(Default)]
pub struct CompositeTransport {
    transports: Vec<Box<dyn Transport>>,
}

impl CompositeTransport {
    pub fn new(transports: Vec<Box<dyn Transport>>) -> Self {
        Self { transports }
    }

    /// 전송 계층을 뒤에 추가합니다.
    pub fn with(mut self, transport: impl Transport + 'static) -> Self {
        self.transports.push(Box::new(transport));
        self
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// 감싼 전송 계층 이름 (등록 순서)
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.transports.iter().map(|t| t.name())
    }
}

impl Transport for CompositeTransport {
    fn name(&self) -> &str {
        NAME
    }

    fn send(&self, line: &str) -> Result<(), DeliveryError> {
        let mut first_error = None;
        for (idx, transport) in self.transports.iter().enumerate() {
            if let Err(e) = transport.send(line) {
                warn!(member = idx, transport = transport.name(), error = %e, "composite member failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
