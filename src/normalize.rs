//! Turn arbitrary values into well-formed `BaseError` chains.
//!
//! `normalize` is total: whatever comes in, a chain that passes
//! `deep_check` comes out.  Recoverable information is kept:
//!
//!   non-object          → `{ message: stringify(value) }`
//!   object, valid       → fields copied as they are
//!   object, invalid     → only fields of the right type are copied;
//!                         a missing message becomes the JSON of the input;
//!                         malformed issues are coerced;
//!                         reserved keys are stripped
//!
//! The chain is processed iteratively, so depth is bounded by memory
//! rather than by the call stack.

use serde_json::{Map, Value};
use std::error::Error;

use crate::base_error::{strip_identifiers, strip_response_fields, BaseError};
use crate::constants::*;
use crate::shape::{Fields, ValidationIssue};
use crate::validate::{check_shallow, issue_message, status_of};

/// Normalize an arbitrary JSON value into an error chain.
pub fn normalize(value: Value) -> BaseError {
    let (mut top, mut pending) = normalize_node(value);

    let mut below = Vec::new();
    while let Some(next) = pending.take() {
        let (node, cause) = normalize_node(next);
        below.push(node);
        pending = cause;
    }

    top.cause = link(below).map(Box::new);
    top
}

/// Convert a native error and its `source()` chain into an error chain.
///
/// A `BaseError` anywhere in the chain is cloned along with its causes,
/// so structured fields set deeper down survive.
pub fn normalize_error(err: &(dyn Error + 'static)) -> BaseError {
    let mut nodes = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(base) = e.downcast_ref::<BaseError>() {
            nodes.push(base.clone());
            break;
        }
        nodes.push(BaseError::bare(e.to_string()));
        current = e.source();
    }
    link(nodes).unwrap_or_else(|| BaseError::bare(err.to_string()))
}

/// Text form of a value: strings as-is, anything else as compact JSON.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => to_json_text(other),
    }
}

/// Link nodes top-first into a chain.  The last node keeps its own cause.
fn link(nodes: Vec<BaseError>) -> Option<BaseError> {
    nodes.into_iter().rev().fold(None, |below, mut node| {
        if below.is_some() {
            node.cause = below.map(Box::new);
        }
        Some(node)
    })
}

/// Normalize one node; returns it without a cause, plus the raw cause.
fn normalize_node(value: Value) -> (BaseError, Option<Value>) {
    if let Err(violation) = check_shallow(&value) {
        tracing::debug!(
            code = violation.code(),
            "reconstructing non-conformant error value: {violation}"
        );
    }

    let mut obj = match value {
        Value::Object(obj) => obj,
        other => return (BaseError::bare(stringify_value(&other)), None),
    };

    let message = match obj.get(FIELD_MESSAGE) {
        Some(Value::String(s)) => s.clone(),
        _ => to_json_text(&Value::Object(obj.clone())),
    };

    let cause = obj.remove(FIELD_CAUSE).filter(|c| !c.is_null());

    let mut node = BaseError::bare(message);
    node.code = take_string(&mut obj, FIELD_CODE);
    node.status = obj.get(FIELD_STATUS).and_then(status_of);
    node.messages = obj.remove(FIELD_MESSAGES).and_then(coerce_issues);
    node.stack = take_string(&mut obj, FIELD_STACK);
    node.sensitive = obj.get(FIELD_SENSITIVE).and_then(Value::as_bool);
    node.silent = obj.get(FIELD_SILENT).and_then(Value::as_bool);

    if let Some(mut fields) = take_object(&mut obj, FIELD_EXTRA_RESPONSE_FIELDS) {
        strip_response_fields(&mut fields);
        node.extra_response_fields = fields;
    }
    if let Some(mut fields) = take_object(&mut obj, FIELD_EXTRA_ERROR_IDENTIFIERS) {
        strip_identifiers(&mut fields);
        node.extra_error_identifiers = fields;
    }

    (node, cause)
}

/// Coerce each entry into an issue.  A non-array yields `None`.
fn coerce_issues(value: Value) -> Option<Vec<ValidationIssue>> {
    match value {
        Value::Array(items) => Some(items.into_iter().map(coerce_issue).collect()),
        _ => None,
    }
}

fn coerce_issue(item: Value) -> ValidationIssue {
    if let Value::String(s) = item {
        return ValidationIssue::new(s);
    }
    match issue_message(&item) {
        Some(message) => ValidationIssue::new(message),
        None => ValidationIssue::new(to_json_text(&item)),
    }
}

fn take_string(obj: &mut Map<String, Value>, field: &str) -> Option<String> {
    match obj.remove(field) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn take_object(obj: &mut Map<String, Value>, field: &str) -> Option<Fields> {
    match obj.remove(field) {
        Some(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

fn to_json_text(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| UNSERIALIZABLE_PLACEHOLDER.to_string())
}
