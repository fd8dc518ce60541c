//! Reporter configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//! Environment variables override the loaded values:
//!
//!   FAULTLINE_RESPONSE_STACK_TRACE   "1"/"true" or "0"/"false"
//!   FAULTLINE_WORKING_DIR            path used to shorten stack frames

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::constants::*;
use crate::errors::ConfigError;

/// Options for `format_for_log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogOptions {
    pub include_code_and_status: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            include_code_and_status: true,
        }
    }
}

/// Options for `to_response`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResponseOptions {
    /// Expose the root stack trace to clients.  Off in production.
    pub include_stack_trace: bool,
}

/// How root stack traces are parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackTraceConfig {
    pub frame_marker: String,
    /// Prefix rewritten to `.` in frames.
    pub working_dir: Option<PathBuf>,
    /// Use the process working directory when `working_dir` is unset.
    pub detect_working_dir: bool,
}

impl Default for StackTraceConfig {
    fn default() -> Self {
        Self {
            frame_marker: FRAME_MARKER.to_string(),
            working_dir: None,
            detect_working_dir: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    pub log: LogOptions,
    pub response: ResponseOptions,
    pub stack_trace: StackTraceConfig,
}

impl ReportConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Apply `FAULTLINE_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| env::var(var).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(ENV_RESPONSE_STACK_TRACE) {
            self.response.include_stack_trace = parse_flag(ENV_RESPONSE_STACK_TRACE, &raw)?;
        }
        if let Some(dir) = lookup(ENV_WORKING_DIR).filter(|d| !d.is_empty()) {
            self.stack_trace.working_dir = Some(PathBuf::from(dir));
        }
        Ok(self)
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Env {
            var,
            value: raw.to_string(),
        }),
    }
}
