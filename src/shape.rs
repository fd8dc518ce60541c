//! The error shape every link of a cause chain satisfies.
//!
//! `ErrorShape` is read-only: it exposes what the analyzer
//! needs and nothing else.  `BaseError` is the crate's own implementation,
//! but any type can take part in a chain by implementing the trait.
//!
//! A chain is singly linked through `cause()`.  Walking it is done with
//! [`chain`], which yields the top error first and the root cause last.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::base_error::BaseError;
use crate::constants::MAX_CHAIN_DEPTH;

/// String-keyed JSON fields attached to an error.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// One structured sub-issue of an error, typically a form field problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for ValidationIssue {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ValidationIssue {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Canonical error interface.
///
/// Only `message` is required.  Everything else defaults to "not set",
/// which matters to the analyzer: an unset field lets a deeper error in
/// the chain supply the value.
pub trait ErrorShape: fmt::Debug {
    /// Human-readable summary.
    fn message(&self) -> &str;

    /// Machine-readable identifier, conventionally `E_...`.
    fn code(&self) -> Option<&str> {
        None
    }

    /// Suggested response status.
    fn status(&self) -> Option<u16> {
        None
    }

    fn messages(&self) -> Option<&[ValidationIssue]> {
        None
    }

    /// Raw platform stack trace text.
    fn stack(&self) -> Option<&str> {
        None
    }

    fn sensitive(&self) -> Option<bool> {
        None
    }

    fn silent(&self) -> Option<bool> {
        None
    }

    /// Fields spread into the response payload.  Must not contain `error`.
    fn extra_response_fields(&self) -> Option<&Fields> {
        None
    }

    /// Fields added to structured logs only.  Must not use a reserved
    /// field name.
    fn extra_error_identifiers(&self) -> Option<&Fields> {
        None
    }

    fn cause(&self) -> Option<&dyn ErrorShape> {
        None
    }

    /// The node as a `BaseError`.  Only `BaseError` itself overrides this.
    #[doc(hidden)]
    fn as_base_error(&self) -> Option<&BaseError> {
        None
    }
}

/// Iterate over `top` and every error reachable through `cause()`.
pub fn chain(top: &dyn ErrorShape) -> Chain<'_> {
    Chain {
        next: Some(top),
        foreign: 0,
    }
}

/// Lazy top-to-root iterator over a cause chain.
///
/// A `BaseError` owns its cause, so from the first `BaseError` on the
/// chain is finite and is walked to the end.  Links through other
/// implementations are counted, and iteration stops after
/// `MAX_CHAIN_DEPTH` of them so a self-referencing type cannot hang the
/// caller.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a dyn ErrorShape>,
    foreign: usize,
}

impl<'a> Chain<'a> {
    /// True when iteration ended because of the depth cap rather than
    /// because the root cause was reached.
    pub fn truncated(&self) -> bool {
        self.foreign >= MAX_CHAIN_DEPTH && self.next.is_some()
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a dyn ErrorShape;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        if current.as_base_error().is_none() {
            if self.foreign >= MAX_CHAIN_DEPTH {
                return None;
            }
            self.foreign += 1;
        }
        self.next = current.cause();
        Some(current)
    }
}
