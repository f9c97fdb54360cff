//! 표준 출력 전송 계층

use std::io::{self, Write};

use parking_lot::Mutex;
use syslogcef_core::error::DeliveryError;
use syslogcef_core::metrics as m;
use syslogcef_core::transport::Transport;

const NAME: &str = "stdout";

/// CEF 라인을 한 줄씩 writer(기본: 표준 출력)에 씁니다.
///
/// syslog 헤더는 붙이지 않습니다.
pub struct StdoutTransport {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl StdoutTransport {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    /// 임의의 writer로 출력합니다.
    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl Default for StdoutTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for StdoutTransport {
    fn name(&self) -> &str {
        NAME
    }

    fn send(&self, line: &str) -> Result<(), DeliveryError> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{line}")
            .and_then(|()| writer.flush())
            .map_err(|source| {
                metrics::counter!(m::TRANSPORT_DELIVERY_ERRORS_TOTAL, m::LABEL_TRANSPORT => NAME)
                    .increment(1);
                DeliveryError::Write {
                    transport: NAME.to_owned(),
                    source,
                }
            })?;
        metrics::counter!(m::TRANSPORT_BYTES_WRITTEN_TOTAL, m::LABEL_TRANSPORT => NAME)
            .increment(line.len() as u64 + 1);
        Ok(())
    }
}
