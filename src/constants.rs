//! Defaults, reserved names, and stack-trace markers.
//!
//! These values are part of the observable contract: response payloads and
//! log lines carry the defaults verbatim, so downstream dashboards and
//! clients match on them.

/// Status used when no error in the chain sets one.
pub const DEFAULT_STATUS: u16 = 500;

/// Code used when no error in the chain sets one.
pub const DEFAULT_CODE: &str = "E_UNEXPECTED_ERROR";

/// Errors with a status below this are silent unless they say otherwise.
pub const SILENT_STATUS_THRESHOLD: u16 = 500;

/// Message used when a value cannot be turned into text at all.
pub const UNSERIALIZABLE_PLACEHOLDER: &str = "<unserializable error value>";

// ── Field names ──────────────────────────────────────────────
// These are the JSON keys of the error shape.  Keep them camelCase; they
// travel across process boundaries.

pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_CODE: &str = "code";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_MESSAGES: &str = "messages";
pub const FIELD_STACK: &str = "stack";
pub const FIELD_SENSITIVE: &str = "sensitive";
pub const FIELD_SILENT: &str = "silent";
pub const FIELD_EXTRA_RESPONSE_FIELDS: &str = "extraResponseFields";
pub const FIELD_EXTRA_ERROR_IDENTIFIERS: &str = "extraErrorIdentifiers";
pub const FIELD_CAUSE: &str = "cause";

/// Names an extra error identifier may not use.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    FIELD_MESSAGE,
    FIELD_CODE,
    FIELD_STATUS,
    FIELD_MESSAGES,
    FIELD_STACK,
    FIELD_SENSITIVE,
    FIELD_SILENT,
    FIELD_EXTRA_RESPONSE_FIELDS,
    FIELD_EXTRA_ERROR_IDENTIFIERS,
    FIELD_CAUSE,
];

/// The top-level response key.  No extra response field may shadow it.
pub const RESERVED_RESPONSE_FIELD: &str = "error";

// ── Stack traces ─────────────────────────────────────────────
// `std::backtrace::Backtrace` prints each source location on its own line
// as `at <path>:<line>:<col>`, which is the same convention the frame
// parser keys on.

pub const FRAME_MARKER: &str = "at ";
pub const FILE_URI_PREFIX: &str = "file://";

/// Directory under the working directory holding vendored dependencies.
pub const VENDOR_DIR: &str = "vendor";

/// Path prefixes rewritten to bare `crate-version/...` or `std/...` names.
pub const DEPENDENCY_PATH_PATTERNS: &[&str] = &[
    r"^(?:.*/)?\.cargo/registry/src/[^/]+/",
    r"^(?:.*/)?\.cargo/git/checkouts/[^/]+/[^/]+/",
    r"^/rustc/[0-9a-f]+/library/",
];

/// Upper bound on the links walked through `ErrorShape` implementations
/// other than `BaseError`, which could link back to themselves.
pub const MAX_CHAIN_DEPTH: usize = 1024;

// ── Environment ──────────────────────────────────────────────

pub const ENV_RESPONSE_STACK_TRACE: &str = "FAULTLINE_RESPONSE_STACK_TRACE";
pub const ENV_WORKING_DIR: &str = "FAULTLINE_WORKING_DIR";
