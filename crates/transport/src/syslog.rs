//! syslog 소켓 전송 계층 (TCP / UDP)
//!
//! CEF 라인을 syslog 헤더로 감싸 원격 syslog 서버로 보냅니다.
//!
//! - UDP: 메시지 하나당 데이터그램 하나, 트레일러 없음
//! - TCP: 생성 시 연결하고 재사용. 쓰기에 실패하면 스트림을 버리고
//!   다음 `send`에서 한 번 재연결합니다. 실패한 메시지는 다시 보내지 않습니다.
//!
//! 소켓은 전송 계층이 drop될 때 닫힙니다.

use std::fmt;
use std::io::{self, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use syslogcef_core::config::TransportConfig;
use syslogcef_core::error::{ConfigError, DeliveryError};
use syslogcef_core::metrics as m;
use syslogcef_core::transport::Transport;
use tracing::{debug, info, warn};

use crate::framing::{Facility, SyslogFormat, SyslogHeader, TcpFraming};
use crate::local_hostname;

/// syslog 전송 프로토콜
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    fn transport_name(self) -> &'static str {
        match self {
            Self::Tcp => "syslog-tcp",
            Self::Udp => "syslog-udp",
        }
    }
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TCP" => Ok(Self::Tcp),
            "UDP" => Ok(Self::Udp),
            _ => Err(ConfigError::UnsupportedProtocol {
                protocol: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("TCP"),
            Self::Udp => f.write_str("UDP"),
        }
    }
}

/// syslog 전송 계층 설정 (검증 완료된 형태)
#[derive(Debug, Clone)]
pub struct SyslogTransportConfig {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub format: SyslogFormat,
    pub facility: Facility,
    /// RFC 5424 APP-NAME / RFC 3164 TAG
    pub app_name: String,
    /// syslog 헤더 HOSTNAME
    pub hostname: String,
    pub tcp_framing: TcpFraming,
    pub include_bom: bool,
    /// `None`이면 OS 기본값
    pub connect_timeout: Option<Duration>,
    /// `None`이면 무제한
    pub write_timeout: Option<Duration>,
}

impl SyslogTransportConfig {
    /// 기본 옵션으로 설정을 생성합니다.
    ///
    /// `protocol`이 `TCP` 또는 `UDP`가 아니면 소켓을 만들기 전에
    /// [`ConfigError::UnsupportedProtocol`]을, 포트가 0이면
    /// [`ConfigError::InvalidValue`]를 반환합니다.
    pub fn new(host: impl Into<String>, port: u16, protocol: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: host.into(),
            port: check_port(port)?,
            protocol: protocol.parse()?,
            format: SyslogFormat::default(),
            facility: Facility::default(),
            app_name: "syslogcef".to_owned(),
            hostname: local_hostname(),
            tcp_framing: TcpFraming::default(),
            include_bom: true,
            connect_timeout: Some(Duration::from_secs(5)),
            write_timeout: Some(Duration::from_secs(5)),
        })
    }

    /// 설정 파일의 `[[transports]]` 항목에서 변환합니다.
    ///
    /// `app_name`이 없으면 `default_app_name`(보통 deviceProduct)을 사용합니다.
    pub fn from_core(config: &TransportConfig, default_app_name: &str) -> Result<Self, ConfigError> {
        let secs = |value: u64| (value > 0).then(|| Duration::from_secs(value));
        Ok(Self {
            host: config.host.clone(),
            port: check_port(config.port)?,
            protocol: config.protocol.parse()?,
            format: config.format.parse()?,
            facility: config.facility.parse()?,
            app_name: config
                .app_name
                .clone()
                .unwrap_or_else(|| default_app_name.to_owned()),
            hostname: config.hostname.clone().unwrap_or_else(local_hostname),
            tcp_framing: config.tcp_framing.parse()?,
            include_bom: config.include_bom,
            connect_timeout: secs(config.connect_timeout_secs),
            write_timeout: secs(config.write_timeout_secs),
        })
    }

    pub fn with_format(mut self, format: SyslogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_facility(mut self, facility: Facility) -> Self {
        self.facility = facility;
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_tcp_framing(mut self, framing: TcpFraming) -> Self {
        self.tcp_framing = framing;
        self
    }

    pub fn with_bom(mut self, include_bom: bool) -> Self {
        self.include_bom = include_bom;
        self
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

enum Connection {
    Udp(UdpSocket),
    /// 쓰기 실패 후에는 `None`
    Tcp(Option<TcpStream>),
}

/// syslog 서버로 직접 보내는 전송 계층
pub struct SyslogTransport {
    name: &'static str,
    target: String,
    addr: SocketAddr,
    header: SyslogHeader,
    framing: TcpFraming,
    connect_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    conn: Mutex<Connection>,
}

impl SyslogTransport {
    /// 주소를 해석하고 소켓을 엽니다. TCP는 이 시점에 연결합니다.
    pub fn connect(config: SyslogTransportConfig) -> Result<Self, DeliveryError> {
        let target = config.target();
        let addr = resolve(&config.host, config.port, &target)?;
        let header = SyslogHeader::new(
            config.format,
            config.facility,
            &config.hostname,
            &config.app_name,
            config.include_bom,
        );

        let mut transport = Self {
            name: config.protocol.transport_name(),
            target,
            addr,
            header,
            framing: config.tcp_framing,
            connect_timeout: config.connect_timeout,
            write_timeout: config.write_timeout,
            conn: Mutex::new(Connection::Tcp(None)),
        };

        let conn = match config.protocol {
            Protocol::Udp => Connection::Udp(transport.open_udp()?),
            Protocol::Tcp => Connection::Tcp(Some(transport.open_tcp()?)),
        };
        transport.conn = Mutex::new(conn);

        info!(
            transport = transport.name,
            peer = %transport.target,
            format = ?config.format,
            "syslog transport connected"
        );
        Ok(transport)
    }

    /// 해석된 원격 주소
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    /// syslog 헤더 생성기
    pub fn header(&self) -> &SyslogHeader {
        &self.header
    }

    fn open_udp(&self) -> Result<UdpSocket, DeliveryError> {
        let bind_addr: SocketAddr = if self.addr.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let connect_err = |source| DeliveryError::Connect {
            addr: self.target.clone(),
            source,
        };
        let socket = UdpSocket::bind(bind_addr).map_err(connect_err)?;
        socket.connect(self.addr).map_err(connect_err)?;
        socket.set_write_timeout(self.write_timeout).map_err(connect_err)?;
        Ok(socket)
    }

    fn open_tcp(&self) -> Result<TcpStream, DeliveryError> {
        let connect_err = |source| DeliveryError::Connect {
            addr: self.target.clone(),
            source,
        };
        let stream = match self.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&self.addr, timeout),
            None => TcpStream::connect(self.addr),
        }
        .map_err(connect_err)?;
        stream.set_write_timeout(self.write_timeout).map_err(connect_err)?;
        stream.set_nodelay(true).map_err(connect_err)?;
        debug!(peer = %self.target, "tcp connection established");
        Ok(stream)
    }

    fn write_failed(&self, source: io::Error) -> DeliveryError {
        metrics::counter!(m::TRANSPORT_DELIVERY_ERRORS_TOTAL, m::LABEL_TRANSPORT => self.name)
            .increment(1);
        warn!(transport = self.name, peer = %self.target, error = %source, "syslog write failed");
        DeliveryError::Write {
            transport: self.name.to_owned(),
            source,
        }
    }
}

impl Transport for SyslogTransport {
    fn name(&self) -> &str {
        self.name
    }

    fn send(&self, line: &str) -> Result<(), DeliveryError> {
        let message = self.header.wrap(line, Utc::now());
        let mut conn = self.conn.lock();

        let written = match &mut *conn {
            Connection::Udp(socket) => socket
                .send(message.as_bytes())
                .map_err(|e| self.write_failed(e))?,
            Connection::Tcp(slot) => {
                let mut stream = match slot.take() {
                    Some(stream) => stream,
                    None => {
                        let stream = self.open_tcp().inspect_err(|_| {
                            metrics::counter!(
                                m::TRANSPORT_DELIVERY_ERRORS_TOTAL,
                                m::LABEL_TRANSPORT => self.name
                            )
                            .increment(1);
                        })?;
                        metrics::counter!(m::TRANSPORT_RECONNECTS_TOTAL, m::LABEL_TRANSPORT => self.name)
                            .increment(1);
                        stream
                    }
                };
                let bytes = self.framing.frame(&message);
                // 실패한 스트림은 여기서 drop되어 닫힌다
                stream
                    .write_all(&bytes)
                    .and_then(|()| stream.flush())
                    .map_err(|e| self.write_failed(e))?;
                *slot = Some(stream);
                bytes.len()
            }
        };

        metrics::counter!(m::TRANSPORT_BYTES_WRITTEN_TOTAL, m::LABEL_TRANSPORT => self.name)
            .increment(written as u64);
        Ok(())
    }
}

impl Drop for SyslogTransport {
    fn drop(&mut self) {
        if let Connection::Tcp(Some(stream)) = &*self.conn.get_mut() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// 유효 포트 범위: 1-65535
fn check_port(port: u16) -> Result<u16, ConfigError> {
    if port == 0 {
        return Err(ConfigError::InvalidValue {
            field: "port".to_owned(),
            reason: "must be in range 1-65535".to_owned(),
        });
    }
    Ok(port)
}

fn resolve(host: &str, port: u16, target: &str) -> Result<SocketAddr, DeliveryError> {
    let resolve_err = |source| DeliveryError::Resolve {
        addr: target.to_owned(),
        source,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(resolve_err)?
        .next()
        .ok_or_else(|| resolve_err(io::Error::new(io::ErrorKind::NotFound, "no addresses found")))
}
