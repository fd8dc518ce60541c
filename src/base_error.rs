//! `BaseError`: the concrete error value thrown by application code.
//!
//! Fields are private.  The only ways in are the constructors and setters
//! below, which keep the two reserved-key invariants:
//!
//! - `extra_response_fields` never contains `error`;
//! - `extra_error_identifiers` never uses a reserved field name.
//!
//! The cause is owned, so a `BaseError` chain is always finite.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

use crate::constants::*;
use crate::errors::ShapeError;
use crate::normalize::normalize;
use crate::shape::{ErrorShape, Fields, ValidationIssue};

/// Options accepted by [`BaseError::with_options`].
#[derive(Debug, Clone, Default)]
pub struct ErrorOptions {
    pub code: Option<String>,
    pub status: Option<u16>,
    pub messages: Option<Vec<ValidationIssue>>,
    pub cause: Option<BaseError>,
    pub sensitive: Option<bool>,
    pub silent: Option<bool>,
    pub extra_response_fields: Fields,
    pub extra_error_identifiers: Fields,
}

/// A structured error with an optional cause.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseError {
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) messages: Option<Vec<ValidationIssue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sensitive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) silent: Option<bool>,
    pub(crate) extra_response_fields: Fields,
    pub(crate) extra_error_identifiers: Fields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) cause: Option<Box<BaseError>>,
}

impl BaseError {
    /// Create an error with only a message.  A backtrace is recorded into
    /// `stack` when backtraces are enabled for the process.
    pub fn new(message: impl Into<String>) -> Self {
        let mut err = Self::bare(message.into());
        err.stack = capture_stack();
        err
    }

    /// Create an error from a message and options, rejecting reserved keys.
    pub fn with_options(
        message: impl Into<String>,
        options: ErrorOptions,
    ) -> Result<Self, ShapeError> {
        check_response_fields(&options.extra_response_fields)?;
        check_identifiers(&options.extra_error_identifiers)?;
        Ok(Self::from_options_unchecked(message.into(), options))
    }

    /// Like `with_options`, but silently drops reserved keys instead of
    /// failing.  Returns the names that were dropped.
    pub(crate) fn with_options_lossy(
        message: impl Into<String>,
        mut options: ErrorOptions,
    ) -> (Self, Vec<String>) {
        let mut dropped = strip_response_fields(&mut options.extra_response_fields);
        dropped.extend(strip_identifiers(&mut options.extra_error_identifiers));
        (Self::from_options_unchecked(message.into(), options), dropped)
    }

    fn from_options_unchecked(message: String, options: ErrorOptions) -> Self {
        Self {
            message,
            code: options.code,
            status: options.status,
            messages: options.messages,
            stack: capture_stack(),
            sensitive: options.sensitive,
            silent: options.silent,
            extra_response_fields: options.extra_response_fields,
            extra_error_identifiers: options.extra_error_identifiers,
            cause: options.cause.map(Box::new),
        }
    }

    /// A message-only error with no backtrace.  Used when reconstructing
    /// foreign values, where a backtrace of the normalizer is noise.
    pub(crate) fn bare(message: String) -> Self {
        Self {
            message,
            code: None,
            status: None,
            messages: None,
            stack: None,
            sensitive: None,
            silent: None,
            extra_response_fields: Fields::new(),
            extra_error_identifiers: Fields::new(),
            cause: None,
        }
    }

    // ── Fluent setters ───────────────────────────────────────

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach validation issues; plain strings and `ValidationIssue`s both work.
    pub fn with_messages<I, M>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<ValidationIssue>,
    {
        self.messages = Some(messages.into_iter().map(Into::into).collect());
        self
    }

    /// Set the cause.  Anything convertible to `BaseError` is accepted,
    /// including raw JSON values, which are normalized.
    pub fn with_cause(mut self, cause: impl Into<BaseError>) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self
    }

    pub fn with_sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = Some(sensitive);
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    /// Replace the recorded stack text.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_response_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, ShapeError> {
        let key = key.into();
        if key == RESERVED_RESPONSE_FIELD {
            return Err(ShapeError::ReservedResponseField);
        }
        self.extra_response_fields.insert(key, value.into());
        Ok(self)
    }

    pub fn with_identifier(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, ShapeError> {
        let key = key.into();
        if is_reserved_identifier(&key) {
            return Err(ShapeError::ReservedIdentifier(key));
        }
        self.extra_error_identifiers.insert(key, value.into());
        Ok(self)
    }

    /// The direct cause, as a `BaseError`.
    pub fn base_cause(&self) -> Option<&BaseError> {
        self.cause.as_deref()
    }

    /// The serialized JSON form.  Always passes `deep_check`.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self)
            .unwrap_or_else(|_| serde_json::json!({ "message": UNSERIALIZABLE_PLACEHOLDER }))
    }
}

impl ErrorShape for BaseError {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn status(&self) -> Option<u16> {
        self.status
    }

    fn messages(&self) -> Option<&[ValidationIssue]> {
        self.messages.as_deref()
    }

    fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    fn sensitive(&self) -> Option<bool> {
        self.sensitive
    }

    fn silent(&self) -> Option<bool> {
        self.silent
    }

    fn extra_response_fields(&self) -> Option<&Fields> {
        Some(&self.extra_response_fields)
    }

    fn extra_error_identifiers(&self) -> Option<&Fields> {
        Some(&self.extra_error_identifiers)
    }

    fn cause(&self) -> Option<&dyn ErrorShape> {
        self.cause.as_deref().map(|c| c as &dyn ErrorShape)
    }

    fn as_base_error(&self) -> Option<&BaseError> {
        Some(self)
    }
}

impl fmt::Display for BaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for BaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

impl From<&str> for BaseError {
    fn from(message: &str) -> Self {
        Self::bare(message.to_string())
    }
}

impl From<String> for BaseError {
    fn from(message: String) -> Self {
        Self::bare(message)
    }
}

impl From<Value> for BaseError {
    fn from(value: Value) -> Self {
        normalize(value)
    }
}

/// Any JSON deserializes: the value is read first, then normalized.
impl<'de> Deserialize<'de> for BaseError {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(normalize(value))
    }
}

// ── Reserved-key helpers ─────────────────────────────────────

pub(crate) fn is_reserved_identifier(key: &str) -> bool {
    RESERVED_IDENTIFIERS.contains(&key)
}

pub(crate) fn check_response_fields(fields: &Fields) -> Result<(), ShapeError> {
    if fields.contains_key(RESERVED_RESPONSE_FIELD) {
        return Err(ShapeError::ReservedResponseField);
    }
    Ok(())
}

pub(crate) fn check_identifiers(fields: &Fields) -> Result<(), ShapeError> {
    match fields.keys().find(|k| is_reserved_identifier(k)) {
        Some(key) => Err(ShapeError::ReservedIdentifier(key.clone())),
        None => Ok(()),
    }
}

pub(crate) fn strip_response_fields(fields: &mut Fields) -> Vec<String> {
    match fields.remove(RESERVED_RESPONSE_FIELD) {
        Some(_) => vec![RESERVED_RESPONSE_FIELD.to_string()],
        None => Vec::new(),
    }
}

pub(crate) fn strip_identifiers(fields: &mut Fields) -> Vec<String> {
    let reserved: Vec<String> = fields
        .keys()
        .filter(|k| is_reserved_identifier(k))
        .cloned()
        .collect();
    for key in &reserved {
        fields.remove(key);
    }
    reserved
}

fn capture_stack() -> Option<String> {
    let bt = Backtrace::capture();
    match bt.status() {
        BacktraceStatus::Captured => Some(bt.to_string()),
        _ => None,
    }
}
