//! 전송 trait -- 완성된 CEF 라인을 목적지로 옮기는 확장 포인트

use std::sync::Arc;

use crate::error::DeliveryError;

/// 완성된 한 줄을 전달하는 전송 계층
///
/// syslog 소켓, 표준 출력, 팬아웃(composite) 등 새 목적지를 지원하려면
/// 이 trait을 구현합니다. `send`는 동기 호출이며 성공하거나 [`DeliveryError`]를
/// 반환합니다. 재시도는 하지 않습니다.
pub trait Transport: Send + Sync {
    /// 전송 계층 이름 (로그/메트릭 레이블용)
    fn name(&self) -> &str;

    /// 한 줄을 전송합니다. 라인에는 개행 문자가 포함되지 않습니다.
    fn send(&self, line: &str) -> Result<(), DeliveryError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&self, line: &str) -> Result<(), DeliveryError> {
        (**self).send(line)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&self, line: &str) -> Result<(), DeliveryError> {
        (**self).send(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        lines: Mutex<Vec<String>>,
    }

    impl Transport for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn send(&self, line: &str) -> Result<(), DeliveryError> {
            self.lines.lock().unwrap().push(line.to_owned());
            Ok(())
        }
    }

    #[test]
    fn boxed_and_shared_transports_delegate() {
        let inner = Arc::new(Recording {
            lines: Mutex::new(Vec::new()),
        });
        let boxed: Box<dyn Transport> = Box::new(Arc::clone(&inner));
        assert_eq!(boxed.name(), "recording");
        boxed.send("CEF:0|a").unwrap();
        assert_eq!(inner.lines.lock().unwrap().as_slice(), ["CEF:0|a"]);
    }
}
