//! `syslogcef test-messages` command handler
//!
//! Sends three canned events so an operator can check that the syslog
//! server receives and parses CEF correctly.

use std::io::Write;

use serde::Serialize;
use tracing::info;

use syslogcef_cef::CefSender;
use syslogcef_core::transport::Transport;
use syslogcef_core::types::FieldMap;
use syslogcef_transport::{
    CompositeTransport, StdoutTransport, SyslogFormat, SyslogTransport, SyslogTransportConfig,
    local_hostname,
};

use crate::cli::TestMessagesArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

pub const TEST_VENDOR: &str = "syslogcef";
pub const TEST_PRODUCT: &str = "syslogcef.testmessages";

struct TestEvent {
    signature_id: &'static str,
    name: &'static str,
    severity: u8,
    reason: Option<&'static str>,
    message: &'static str,
}

const TEST_EVENTS: [TestEvent; 3] = [
    TestEvent {
        signature_id: "1113-100",
        name: "Testing syslogcef OK",
        severity: 0,
        reason: None,
        message: "The syslogcef module is working properly.",
    },
    TestEvent {
        signature_id: "1113-101",
        name: "Testing syslogcef WARN",
        severity: 5,
        reason: None,
        message: "The syslogcef module is still working properly.",
    },
    TestEvent {
        signature_id: "1113-102",
        name: "Testing syslogcef ERROR",
        severity: 9,
        reason: Some("This is only a test."),
        message: "The syslogcef module is working properly again.",
    },
];

/// Execute the `test-messages` command.
///
/// The protocol is checked before any socket is opened.
pub fn execute(args: TestMessagesArgs, writer: &OutputWriter) -> Result<(), CliError> {
    let format: SyslogFormat = args.format.parse()?;
    let syslog_config = SyslogTransportConfig::new(&args.host, args.port, &args.protocol)?
        .with_format(format)
        .with_app_name(TEST_PRODUCT);

    info!(host = %args.host, port = args.port, protocol = %args.protocol, "sending test messages");
    let syslog = SyslogTransport::connect(syslog_config)?;

    let sent = if args.stdout {
        send_test_messages(
            CompositeTransport::default()
                .with(syslog)
                .with(StdoutTransport::new()),
        )?
    } else {
        send_test_messages(syslog)?
    };

    writer.render(&TestMessagesReport {
        target: format!("{}:{}", args.host, args.port),
        protocol: args.protocol,
        sent,
    })
}

/// Register the three test events on a fresh sender and send each once.
///
/// Returns the signature ids in the order they were sent.
pub fn send_test_messages(transport: impl Transport + 'static) -> Result<Vec<String>, CliError> {
    let sender = CefSender::builder(transport)
        .device_vendor(TEST_VENDOR)
        .device_product(TEST_PRODUCT)
        .device_version(env!("CARGO_PKG_VERSION"))
        .field("sourceHostName", local_hostname())
        .build();

    for event in &TEST_EVENTS {
        let mut fields = FieldMap::new();
        if let Some(reason) = event.reason {
            fields.insert("reason", reason);
        }
        sender.register_event(event.signature_id, event.name, event.severity, fields)?;
    }

    let mut sent = Vec::with_capacity(TEST_EVENTS.len());
    for event in &TEST_EVENTS {
        sender.send(event.signature_id, &FieldMap::from([("message", event.message)]))?;
        sent.push(event.signature_id.to_owned());
    }
    Ok(sent)
}

/// Summary of a test-messages run.
#[derive(Debug, Serialize)]
pub struct TestMessagesReport {
    pub target: String,
    pub protocol: String,
    pub sent: Vec<String>,
}

impl Render for TestMessagesReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Sent {} test messages to {} ({})",
            self.sent.len().to_string().green().bold(),
            self.target.bold(),
            self.protocol
        )?;
        for id in &self.sent {
            writeln!(w, "  {}", id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sends_three_lines_in_order() {
        let buffer = Buffer::default();
        let sent = send_test_messages(StdoutTransport::with_writer(buffer.clone()))
            .expect("test messages should send");
        assert_eq!(sent, ["1113-100", "1113-101", "1113-102"]);

        let output = String::from_utf8(buffer.0.lock().expect("lock").clone()).expect("utf-8");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);

        let version = env!("CARGO_PKG_VERSION");
        assert!(lines[0].starts_with(&format!(
            "CEF:0|syslogcef|syslogcef.testmessages|{version}|1113-100|Testing syslogcef OK|0|shost="
        )));
        assert!(lines[0].ends_with(" msg=The syslogcef module is working properly."));
        assert!(lines[1].contains("|1113-101|Testing syslogcef WARN|5|"));
        assert!(lines[2].contains("|1113-102|Testing syslogcef ERROR|9|"));
        assert!(lines[2].contains(" reason=This is only a test. msg=The syslogcef module is working properly again."));
    }

    #[test]
    fn test_bad_protocol_fails_before_connecting() {
        let args = TestMessagesArgs {
            host: "127.0.0.1".to_owned(),
            port: 514,
            protocol: "HTTP".to_owned(),
            format: "rfc5424".to_owned(),
            stdout: false,
        };
        let writer = OutputWriter::new(crate::cli::OutputFormat::Text);
        let err = execute(args, &writer).expect_err("HTTP is not a syslog protocol");
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("HTTP"));
    }

    #[test]
    fn test_port_zero_fails_before_connecting() {
        let args = TestMessagesArgs {
            host: "127.0.0.1".to_owned(),
            port: 0,
            protocol: "UDP".to_owned(),
            format: "rfc5424".to_owned(),
            stdout: false,
        };
        let writer = OutputWriter::new(crate::cli::OutputFormat::Text);
        let err = execute(args, &writer).expect_err("port 0 has no destination");
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn test_report_text() {
        let report = TestMessagesReport {
            target: "127.0.0.1:514".to_owned(),
            protocol: "UDP".to_owned(),
            sent: vec!["1113-100".to_owned()],
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let text = String::from_utf8(buffer).expect("utf-8");
        assert!(text.contains("127.0.0.1:514"));
        assert!(text.contains("1113-100"));
    }
}
