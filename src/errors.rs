//! Error codes and error types for shape validation and configuration.
//!
//! The normalizer never fails; these errors surface only from the strict
//! entry points (`check_shallow`, `check_deep`, `BaseError::with_options`,
//! and the fallible setters) and from config loading.

use thiserror::Error;

// ── Shape violation codes ────────────────────────────────────
// Stable strings so callers can match on them across releases.

pub const ERR_NOT_OBJECT: &str = "ERR_NOT_OBJECT";
pub const ERR_MISSING_MESSAGE: &str = "ERR_MISSING_MESSAGE";
pub const ERR_WRONG_TYPE: &str = "ERR_WRONG_TYPE";
pub const ERR_MALFORMED_ISSUE: &str = "ERR_MALFORMED_ISSUE";
pub const ERR_RESERVED_RESPONSE_FIELD: &str = "ERR_RESERVED_RESPONSE_FIELD";
pub const ERR_RESERVED_IDENTIFIER: &str = "ERR_RESERVED_IDENTIFIER";

/// Why a value does not conform to the error shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("error value must be a JSON object")]
    NotAnObject,

    #[error("error value has no string `message`")]
    MissingMessage,

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("validation issue #{index} must be an object with a string `message`")]
    MalformedIssue { index: usize },

    #[error("extra response fields may not use the reserved key `error`")]
    ReservedResponseField,

    #[error("extra error identifier `{0}` collides with a reserved field name")]
    ReservedIdentifier(String),

    /// A violation somewhere below the top of the chain.  `depth` counts
    /// `cause` links followed, so the direct cause is depth 1.
    #[error("cause at depth {depth}: {source}")]
    InCause {
        depth: usize,
        #[source]
        source: Box<ShapeError>,
    },
}

impl ShapeError {
    /// The stable `ERR_*` code.  For `InCause` this is the nested code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotAnObject => ERR_NOT_OBJECT,
            Self::MissingMessage => ERR_MISSING_MESSAGE,
            Self::WrongType { .. } => ERR_WRONG_TYPE,
            Self::MalformedIssue { .. } => ERR_MALFORMED_ISSUE,
            Self::ReservedResponseField => ERR_RESERVED_RESPONSE_FIELD,
            Self::ReservedIdentifier(_) => ERR_RESERVED_IDENTIFIER,
            Self::InCause { source, .. } => source.code(),
        }
    }
}

/// Failure to load a `ReportConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid report config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value {value:?} for environment variable {var}")]
    Env { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_code_surfaces_through_in_cause() {
        let err = ShapeError::InCause {
            depth: 2,
            source: Box::new(ShapeError::ReservedResponseField),
        };
        assert_eq!(err.code(), ERR_RESERVED_RESPONSE_FIELD);
        assert_eq!(
            err.to_string(),
            "cause at depth 2: extra response fields may not use the reserved key `error`"
        );
    }

    #[test]
    fn wrong_type_names_the_field() {
        let err = ShapeError::WrongType {
            field: "status",
            expected: "an integer between 0 and 65535",
        };
        assert_eq!(err.code(), ERR_WRONG_TYPE);
        assert!(err.to_string().contains("`status`"));
    }
}
