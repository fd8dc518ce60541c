//! Emit an `ErrorReport` as a `tracing` event.
//!
//! Silent reports are skipped.  Server-side failures (status >= 500) log
//! at ERROR, everything else at WARN.  The extra error identifiers go into
//! a structured `identifiers` field as JSON so log pipelines can index them.

use crate::analyze::ErrorReport;
use crate::config::LogOptions;
use crate::constants::SILENT_STATUS_THRESHOLD;
use crate::render::format_for_log;

/// Log `report` unless it is silent.  Returns whether an event was emitted.
pub fn log_report(report: &ErrorReport, options: &LogOptions) -> bool {
    if report.silent {
        return false;
    }

    let text = format_for_log(report, options);
    let identifiers = serde_json::Value::Object(report.extra_error_identifiers.clone()).to_string();

    if report.status >= SILENT_STATUS_THRESHOLD {
        tracing::error!(
            code = %report.code,
            status = report.status,
            identifiers = %identifiers,
            "{text}"
        );
    } else {
        tracing::warn!(
            code = %report.code,
            status = report.status,
            identifiers = %identifiers,
            "{text}"
        );
    }
    true
}
