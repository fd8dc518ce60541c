//! Log emission through `tracing`, captured with a `tracing-subscriber`
//! fmt layer writing into a shared buffer.

use std::io;
use std::sync::{Arc, Mutex};

use faultline::*;
use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buf = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buf.clone())
        .with_ansi(false)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    (out, text)
}

#[test]
fn server_errors_log_at_error_with_fields() {
    let err = BaseError::from("could not load user")
        .with_code("E_DB")
        .with_status(503)
        .with_identifier("requestId", "r-1")
        .unwrap()
        .with_cause("connection refused");
    let report = analyze(&err);

    let (emitted, text) = capture(|| log_report(&report, &LogOptions::default()));
    assert!(emitted);
    assert!(text.contains("ERROR"), "{text}");
    assert!(text.contains("code=E_DB"), "{text}");
    assert!(text.contains("status=503"), "{text}");
    assert!(text.contains(r#"identifiers={"requestId":"r-1"}"#), "{text}");
    assert!(text.contains("Cause stack:"), "{text}");
    assert!(text.contains("connection refused"), "{text}");
}

#[test]
fn client_errors_log_at_warn_when_not_silent() {
    let err = BaseError::from("conflict")
        .with_code("E_CONFLICT")
        .with_status(409)
        .with_silent(false);
    let report = analyze(&err);

    let (emitted, text) = capture(|| log_report(&report, &LogOptions::default()));
    assert!(emitted);
    assert!(text.contains("WARN"), "{text}");
    assert!(!text.contains("ERROR"), "{text}");
}

#[test]
fn silent_reports_are_not_logged() {
    let report = analyze(&BaseError::from("not found").with_status(404));
    assert!(report.silent);

    let (emitted, text) = capture(|| log_report(&report, &LogOptions::default()));
    assert!(!emitted);
    assert!(text.is_empty(), "{text}");
}

#[test]
fn respond_logs_unexpected_errors() {
    let ((status, body), text) = capture(|| respond(json!("kaboom"), &ReportConfig::default()));
    assert_eq!(status, 500);
    assert_eq!(body["error"]["message"], "kaboom");
    assert!(text.contains("kaboom"), "{text}");
    assert!(text.contains("E_UNEXPECTED_ERROR"), "{text}");
}
