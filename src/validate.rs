//! Shape validation for untrusted JSON error values.
//!
//! Shallow validation looks at one node's own fields and ignores `cause`.
//! Deep validation applies it to every node reachable through `cause`.
//!
//! Fields are checked in a fixed order, message first, so the reported
//! violation is the same on every run.

use serde_json::{Map, Value};

use crate::base_error::{check_identifiers, check_response_fields};
use crate::constants::*;
use crate::errors::ShapeError;

const EXPECT_STRING: &str = "a string";
const EXPECT_BOOL: &str = "a boolean";
const EXPECT_STATUS: &str = "an integer between 0 and 65535";
const EXPECT_ISSUES: &str = "an array of validation issues";
const EXPECT_OBJECT: &str = "an object";

/// Check one node without looking at its cause.
pub fn check_shallow(value: &Value) -> Result<(), ShapeError> {
    let obj = value.as_object().ok_or(ShapeError::NotAnObject)?;

    match obj.get(FIELD_MESSAGE) {
        Some(Value::String(_)) => {}
        _ => return Err(ShapeError::MissingMessage),
    }

    optional(obj, FIELD_CODE, EXPECT_STRING, Value::is_string)?;
    optional(obj, FIELD_STATUS, EXPECT_STATUS, |v| status_of(v).is_some())?;
    optional(obj, FIELD_STACK, EXPECT_STRING, Value::is_string)?;
    optional(obj, FIELD_SENSITIVE, EXPECT_BOOL, Value::is_boolean)?;
    optional(obj, FIELD_SILENT, EXPECT_BOOL, Value::is_boolean)?;

    if let Some(messages) = obj.get(FIELD_MESSAGES) {
        let items = messages.as_array().ok_or(ShapeError::WrongType {
            field: FIELD_MESSAGES,
            expected: EXPECT_ISSUES,
        })?;
        if let Some(index) = items.iter().position(|item| issue_message(item).is_none()) {
            return Err(ShapeError::MalformedIssue { index });
        }
    }

    if let Some(fields) = obj.get(FIELD_EXTRA_RESPONSE_FIELDS) {
        let fields = fields.as_object().ok_or(ShapeError::WrongType {
            field: FIELD_EXTRA_RESPONSE_FIELDS,
            expected: EXPECT_OBJECT,
        })?;
        check_response_fields(fields)?;
    }

    if let Some(fields) = obj.get(FIELD_EXTRA_ERROR_IDENTIFIERS) {
        let fields = fields.as_object().ok_or(ShapeError::WrongType {
            field: FIELD_EXTRA_ERROR_IDENTIFIERS,
            expected: EXPECT_OBJECT,
        })?;
        check_identifiers(fields)?;
    }

    Ok(())
}

/// True iff `value` passes [`check_shallow`].
pub fn shallow_check(value: &Value) -> bool {
    check_shallow(value).is_ok()
}

/// Check every node of the chain, top first.
///
/// A `null` cause counts as no cause.  Violations below the top are
/// wrapped in `ShapeError::InCause` with the number of links followed.
pub fn check_deep(value: &Value) -> Result<(), ShapeError> {
    let mut current = value;
    let mut depth = 0usize;
    loop {
        check_shallow(current).map_err(|e| wrap_depth(e, depth))?;
        match cause_of(current) {
            Some(next) => {
                current = next;
                depth += 1;
            }
            None => return Ok(()),
        }
    }
}

/// True iff `value` passes [`check_deep`].
pub fn deep_check(value: &Value) -> bool {
    check_deep(value).is_ok()
}

// ── Helpers shared with the normalizer ───────────────────────

/// The status as `u16`, if the value is a whole number in range.
///
/// Integral floats such as `404.0` count: other services may send every
/// number as a double.
pub(crate) fn status_of(value: &Value) -> Option<u16> {
    if let Some(n) = value.as_u64() {
        return u16::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&f) {
        Some(f as u16)
    } else {
        None
    }
}

/// The message of a well-formed validation issue.
pub(crate) fn issue_message(value: &Value) -> Option<&str> {
    value.as_object()?.get(FIELD_MESSAGE)?.as_str()
}

fn cause_of(value: &Value) -> Option<&Value> {
    value.get(FIELD_CAUSE).filter(|c| !c.is_null())
}

fn optional(
    obj: &Map<String, Value>,
    field: &'static str,
    expected: &'static str,
    accept: impl Fn(&Value) -> bool,
) -> Result<(), ShapeError> {
    match obj.get(field) {
        Some(v) if !accept(v) => Err(ShapeError::WrongType { field, expected }),
        _ => Ok(()),
    }
}

fn wrap_depth(err: ShapeError, depth: usize) -> ShapeError {
    if depth == 0 {
        err
    } else {
        ShapeError::InCause {
            depth,
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_objects_fail() {
        for v in [json!(null), json!("x"), json!(3), json!([]), json!(true)] {
            assert_eq!(check_shallow(&v), Err(ShapeError::NotAnObject));
        }
    }

    #[test]
    fn message_is_required() {
        assert_eq!(check_shallow(&json!({})), Err(ShapeError::MissingMessage));
        assert_eq!(
            check_shallow(&json!({ "message": 1 })),
            Err(ShapeError::MissingMessage)
        );
    }

    #[test]
    fn status_must_fit_u16() {
        assert!(shallow_check(&json!({ "message": "m", "status": 404 })));
        assert!(!shallow_check(&json!({ "message": "m", "status": 404.5 })));
        assert!(!shallow_check(&json!({ "message": "m", "status": -1.0 })));
        assert!(!shallow_check(&json!({ "message": "m", "status": 65536.0 })));
        assert!(!shallow_check(&json!({ "message": "m", "status": -1 })));
        assert!(!shallow_check(&json!({ "message": "m", "status": 70000 })));
    }

    #[test]
    fn integral_float_status_is_accepted() {
        assert_eq!(status_of(&json!(404.0)), Some(404));
        assert_eq!(status_of(&json!(0.0)), Some(0));
        assert!(shallow_check(&json!({ "message": "gone", "status": 404.0 })));
    }

    #[test]
    fn malformed_issue_reports_index() {
        let v = json!({ "message": "m", "messages": [{ "message": "ok" }, "bare"] });
        assert_eq!(check_shallow(&v), Err(ShapeError::MalformedIssue { index: 1 }));
    }

    #[test]
    fn reserved_keys_fail() {
        let v = json!({ "message": "m", "extraResponseFields": { "error": 1 } });
        assert_eq!(check_shallow(&v), Err(ShapeError::ReservedResponseField));

        let v = json!({ "message": "m", "extraErrorIdentifiers": { "code": 1 } });
        assert_eq!(
            check_shallow(&v),
            Err(ShapeError::ReservedIdentifier("code".into()))
        );
    }

    #[test]
    fn shallow_ignores_cause() {
        let v = json!({ "message": "m", "cause": 42 });
        assert!(shallow_check(&v));
        assert!(!deep_check(&v));
    }

    #[test]
    fn deep_reports_depth() {
        let v = json!({
            "message": "a",
            "cause": { "message": "b", "cause": { "message": "c", "silent": "yes" } }
        });
        let err = check_deep(&v).unwrap_err();
        match err {
            ShapeError::InCause { depth, ref source } => {
                assert_eq!(depth, 2);
                assert!(matches!(**source, ShapeError::WrongType { field: "silent", .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn null_cause_is_absent() {
        assert!(deep_check(&json!({ "message": "m", "cause": null })));
    }
}
