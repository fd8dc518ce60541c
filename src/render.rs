//! Projections of an `ErrorReport`: a log text block and a response body.
//!
//! Both are pure.  The log form always carries full detail; whether to log
//! at all is the caller's call (see `ErrorReport::silent`).  The response
//! form is what a client may see: the cause stack is withheld for
//! sensitive errors and the stack trace is opt-in.

use serde_json::{Map, Value};

use crate::analyze::ErrorReport;
use crate::config::{LogOptions, ResponseOptions};
use crate::constants::RESERVED_RESPONSE_FIELD;
use crate::shape::ValidationIssue;

const INDENT: &str = "  ";

/// Multi-line log text.
///
/// ```text
/// <message>
/// Code: <code>, status: <status>
/// Cause stack:
///   <message>
/// Root stack trace:
///   <frame>
/// Extra error identifiers:
///   <key>: <json>
/// ```
pub fn format_for_log(report: &ErrorReport, options: &LogOptions) -> String {
    let mut out = String::new();
    out.push_str(&report.message);

    if options.include_code_and_status {
        out.push_str(&format!("\nCode: {}, status: {}", report.code, report.status));
    }

    out.push_str("\nCause stack:");
    for entry in &report.cause_stack {
        out.push_str(&format!("\n{INDENT}{entry}"));
    }

    out.push_str("\nRoot stack trace:");
    for frame in &report.root_stack_trace {
        out.push_str(&format!("\n{INDENT}{frame}"));
    }

    out.push_str("\nExtra error identifiers:");
    for (key, value) in &report.extra_error_identifiers {
        out.push_str(&format!("\n{INDENT}{key}: {value}"));
    }

    out
}

/// Client-safe JSON body: `{ "error": {...}, ...extra_response_fields }`.
pub fn to_response(report: &ErrorReport, options: &ResponseOptions) -> Value {
    let mut error = Map::new();
    error.insert("message".into(), Value::String(report.message.clone()));
    error.insert("code".into(), Value::String(report.code.clone()));

    if let Some(issues) = &report.validation_issues {
        error.insert("validationIssues".into(), issues_value(issues));
    }
    if !report.sensitive {
        error.insert("causeStack".into(), strings_value(&report.cause_stack));
    }
    if options.include_stack_trace {
        error.insert("rootStackTrace".into(), strings_value(&report.root_stack_trace));
    }

    let mut body = Map::new();
    for (key, value) in &report.extra_response_fields {
        if key != RESERVED_RESPONSE_FIELD {
            body.insert(key.clone(), value.clone());
        }
    }
    body.insert(RESERVED_RESPONSE_FIELD.into(), Value::Object(error));
    Value::Object(body)
}

fn strings_value(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

fn issues_value(issues: &[ValidationIssue]) -> Value {
    Value::Array(
        issues
            .iter()
            .map(|issue| {
                let mut obj = Map::new();
                obj.insert("message".into(), Value::String(issue.message.clone()));
                Value::Object(obj)
            })
            .collect(),
    )
}
