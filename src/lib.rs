//! # faultline: structured error chains for server-side code
//!
//! Normalize whatever was thrown into a well-formed cause chain, fold the
//! chain into one `ErrorReport`, then render the report for the log and
//! for the client.
//!
//! ```
//! use faultline::{analyze, format_for_log, to_response, BaseError, LogOptions, ResponseOptions};
//!
//! let err = BaseError::new("could not create account")
//!     .with_code("E_SIGNUP")
//!     .with_cause(BaseError::from("email already taken").with_status(409));
//!
//! let report = analyze(&err);
//! assert_eq!(report.status, 409);
//! assert!(report.silent);
//!
//! let body = to_response(&report, &ResponseOptions::default());
//! assert_eq!(body["error"]["code"], "E_SIGNUP");
//!
//! let text = format_for_log(&report, &LogOptions::default());
//! assert!(text.starts_with("could not create account\nCode: E_SIGNUP, status: 409"));
//! ```
//!
//! Untrusted values, e.g. an error object received from another service,
//! go through [`normalize`] first.  Native Rust errors go through
//! [`normalize_error`].

pub mod analyze;
pub mod base_error;
pub mod config;
pub mod constants;
pub mod context;
pub mod errors;
pub mod logging;
pub mod normalize;
pub mod render;
pub mod shape;
pub mod stack;
pub mod validate;

pub use analyze::{analyze, Analyzer, ErrorReport};
pub use base_error::{BaseError, ErrorOptions};
pub use config::{LogOptions, ReportConfig, ResponseOptions, StackTraceConfig};
pub use context::{ErrorContext, ResultExt};
pub use errors::{ConfigError, ShapeError};
pub use logging::log_report;
pub use normalize::{normalize, normalize_error, stringify_value};
pub use render::{format_for_log, to_response};
pub use shape::{chain, ErrorShape, Fields, ValidationIssue};
pub use stack::{FrameParser, MarkerFrameParser};
pub use validate::{check_deep, check_shallow, deep_check, shallow_check};

// ── HTTP boundary ────────────────────────────────────────────

/// Handle a caught value at the HTTP boundary.
///
/// Runs normalize → analyze → log → render and returns the transport
/// status together with the JSON body.  Logging is skipped for silent
/// errors.
pub fn respond(value: serde_json::Value, config: &ReportConfig) -> (u16, serde_json::Value) {
    respond_to(&normalize(value), config)
}

/// Like [`respond`], for an error that is already well formed.
pub fn respond_to(err: &dyn ErrorShape, config: &ReportConfig) -> (u16, serde_json::Value) {
    let report = Analyzer::from_config(&config.stack_trace).analyze(err);
    log_report(&report, &config.log);
    (report.status, to_response(&report, &config.response))
}
