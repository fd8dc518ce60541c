//! Wrap failures in a higher-level error, keeping the original as cause.
//!
//! Synchronous results get the `ResultExt` extension trait.  Pending
//! computations go through the free async functions [`context`] and
//! [`with_context`]; both pass success through untouched, and
//! `with_context` builds its context only when the computation fails.
//!
//! ```
//! use faultline::context::ResultExt;
//! use faultline::ErrorShape;
//!
//! let parsed: Result<u16, _> = "x".parse::<u16>().context("port must be a number");
//! let err = parsed.unwrap_err();
//! assert_eq!(err.message(), "port must be a number");
//! assert_eq!(err.base_cause().unwrap().message(), "invalid digit found in string");
//! ```

use std::error::Error;
use std::future::Future;

use crate::base_error::{BaseError, ErrorOptions};
use crate::normalize::normalize_error;

/// Message plus options for the wrapping error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub message: String,
    pub options: ErrorOptions,
}

impl ErrorContext {
    pub fn new(message: impl Into<String>, options: ErrorOptions) -> Self {
        Self {
            message: message.into(),
            options,
        }
    }

    /// Build the wrapping error with `cause` as its cause.
    ///
    /// Reserved keys in the options are dropped with a warning: wrapping
    /// must always yield an error.
    pub fn wrap(self, cause: BaseError) -> BaseError {
        let mut options = self.options;
        options.cause = Some(cause);
        let (err, dropped) = BaseError::with_options_lossy(self.message, options);
        if !dropped.is_empty() {
            tracing::warn!(?dropped, "reserved keys dropped from error context");
        }
        err
    }
}

impl From<&str> for ErrorContext {
    fn from(message: &str) -> Self {
        Self::new(message, ErrorOptions::default())
    }
}

impl From<String> for ErrorContext {
    fn from(message: String) -> Self {
        Self::new(message, ErrorOptions::default())
    }
}

impl<S: Into<String>> From<(S, ErrorOptions)> for ErrorContext {
    fn from((message, options): (S, ErrorOptions)) -> Self {
        Self::new(message, options)
    }
}

/// Context wrapping for `Result`.
pub trait ResultExt<T> {
    fn context<C: Into<ErrorContext>>(self, context: C) -> Result<T, BaseError>;

    /// Like `context`, but `f` runs only on `Err`.
    fn with_context<C, F>(self, f: F) -> Result<T, BaseError>
    where
        C: Into<ErrorContext>,
        F: FnOnce() -> C;
}

impl<T, E: Error + 'static> ResultExt<T> for Result<T, E> {
    fn context<C: Into<ErrorContext>>(self, context: C) -> Result<T, BaseError> {
        self.map_err(|e| context.into().wrap(into_cause(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, BaseError>
    where
        C: Into<ErrorContext>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| f().into().wrap(into_cause(e)))
    }
}

/// Await `future`; on failure, wrap the error in `context`.
pub async fn context<Fut, T, E, C>(future: Fut, context: C) -> Result<T, BaseError>
where
    Fut: Future<Output = Result<T, E>>,
    E: Error + 'static,
    C: Into<ErrorContext>,
{
    future.await.context(context)
}

/// Await `future`; on failure, call `f` and wrap the error in its result.
pub async fn with_context<Fut, T, E, C, F>(future: Fut, f: F) -> Result<T, BaseError>
where
    Fut: Future<Output = Result<T, E>>,
    E: Error + 'static,
    C: Into<ErrorContext>,
    F: FnOnce() -> C,
{
    future.await.with_context(f)
}

/// Reuse a `BaseError` as is; normalize anything else.
fn into_cause<E: Error + 'static>(err: E) -> BaseError {
    let boxed: Box<dyn Error> = Box::new(err);
    match boxed.downcast::<BaseError>() {
        Ok(base) => *base,
        Err(other) => normalize_error(other.as_ref()),
    }
}
