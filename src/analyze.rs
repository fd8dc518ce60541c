//! Cause-chain analysis: fold a chain into one `ErrorReport`.
//!
//! The walk starts at the top error and follows `cause` to the root.
//! Scalar fields are first-write-wins, so the error closest to the top
//! decides.  The field maps merge per key under the same rule.  `silent`
//! resolves per node as: explicit flag, else `status < 500`, else unknown.
//! The root stack trace comes from the deepest node.

use serde::Serialize;

use crate::config::StackTraceConfig;
use crate::constants::*;
use crate::shape::{chain, ErrorShape, Fields, ValidationIssue};
use crate::stack::{FrameParser, MarkerFrameParser};

/// Aggregate view of one cause chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// The top error's message.
    pub message: String,
    pub code: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_issues: Option<Vec<ValidationIssue>>,
    pub sensitive: bool,
    pub silent: bool,
    pub extra_response_fields: Fields,
    pub extra_error_identifiers: Fields,
    /// Every message in the chain, top first.
    pub cause_stack: Vec<String>,
    /// Parsed frames of the root cause's stack.
    pub root_stack_trace: Vec<String>,
}

/// Analyzes chains with a given stack parsing strategy.
#[derive(Debug, Clone, Default)]
pub struct Analyzer<P = MarkerFrameParser> {
    parser: P,
}

impl Analyzer<MarkerFrameParser> {
    pub fn from_config(config: &StackTraceConfig) -> Self {
        Self {
            parser: MarkerFrameParser::from_config(config),
        }
    }
}

impl<P: FrameParser> Analyzer<P> {
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    pub fn analyze(&self, top: &dyn ErrorShape) -> ErrorReport {
        let mut nodes = chain(top);
        let acc = nodes.by_ref().fold(Accumulator::default(), Accumulator::visit);
        if nodes.truncated() {
            tracing::warn!(
                max_depth = MAX_CHAIN_DEPTH,
                "cause chain truncated; the error links back to itself or is too deep"
            );
        }
        acc.finish(top.message(), &self.parser)
    }
}

/// Analyze with the default frame parser.
pub fn analyze(top: &dyn ErrorShape) -> ErrorReport {
    Analyzer::<MarkerFrameParser>::default().analyze(top)
}

#[derive(Default)]
struct Accumulator<'a> {
    code: Option<&'a str>,
    status: Option<u16>,
    validation_issues: Option<&'a [ValidationIssue]>,
    sensitive: Option<bool>,
    silent: Option<bool>,
    extra_response_fields: Fields,
    extra_error_identifiers: Fields,
    cause_stack: Vec<String>,
    last_stack: Option<&'a str>,
}

impl<'a> Accumulator<'a> {
    fn visit(mut self, node: &'a dyn ErrorShape) -> Self {
        self.cause_stack.push(node.message().to_string());

        self.code = self.code.or(node.code());
        self.status = self.status.or(node.status());
        self.validation_issues = self.validation_issues.or(node.messages());
        self.sensitive = self.sensitive.or(node.sensitive());
        self.silent = self.silent.or_else(|| resolve_silent(node));

        if let Some(fields) = node.extra_response_fields() {
            merge_absent(&mut self.extra_response_fields, fields, Some(RESERVED_RESPONSE_FIELD));
        }
        if let Some(fields) = node.extra_error_identifiers() {
            merge_absent(&mut self.extra_error_identifiers, fields, None);
        }

        self.last_stack = node.stack();
        self
    }

    fn finish(self, message: &str, parser: &impl FrameParser) -> ErrorReport {
        ErrorReport {
            message: message.to_string(),
            code: self.code.unwrap_or(DEFAULT_CODE).to_string(),
            status: self.status.unwrap_or(DEFAULT_STATUS),
            validation_issues: self.validation_issues.map(<[ValidationIssue]>::to_vec),
            sensitive: self.sensitive.unwrap_or(false),
            silent: self.silent.unwrap_or(false),
            extra_response_fields: self.extra_response_fields,
            extra_error_identifiers: self.extra_error_identifiers,
            cause_stack: self.cause_stack,
            root_stack_trace: self.last_stack.map(|s| parser.parse(s)).unwrap_or_default(),
        }
    }
}

fn resolve_silent(node: &dyn ErrorShape) -> Option<bool> {
    node.silent()
        .or_else(|| node.status().map(|s| s < SILENT_STATUS_THRESHOLD))
}

/// Copy keys from `from` that `into` does not have yet.
fn merge_absent(into: &mut Fields, from: &Fields, skip: Option<&str>) {
    for (key, value) in from {
        if Some(key.as_str()) == skip || into.contains_key(key) {
            continue;
        }
        into.insert(key.clone(), value.clone());
    }
}
