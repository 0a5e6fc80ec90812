//! Error types for Courier.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`DispatchError`] - Errors from command/query dispatch
//! - [`PublishError`] - Errors from event fan-out
//! - [`AggregateError`] - The collected failures of a fan-out
//! - [`RegistrationError`] - Malformed registrations
//!
//! Every failure in the dispatch path is surfaced as an error value; the
//! engine never aborts the process. Panics inside caller-supplied handlers
//! or middleware are that code's own failure domain and propagate untouched.

use crate::key::TypeKey;
use std::fmt;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while dispatching a command or query.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No handler is registered for the resolved request type.
    #[error("no handler registered for request type `{0}`")]
    HandlerNotFound(TypeKey),

    /// The handler's response type does not match what the caller expected.
    #[error("response type mismatch: handler produced `{actual}`, caller expected `{expected}`")]
    ResponseTypeMismatch {
        /// Response type the call site asked for.
        expected: &'static str,
        /// Response type the registered handler produces.
        actual: &'static str,
    },

    /// The erased request reaching the handler was not of the registered type.
    ///
    /// This can only happen when a pre-middleware swapped the request payload
    /// for a value of a different type.
    #[error("request type mismatch: handler for `{expected}` received a foreign payload")]
    RequestTypeMismatch {
        /// Request type the handler was registered for.
        expected: &'static str,
    },

    /// The handler itself failed; its error is propagated unchanged.
    #[error(transparent)]
    Handler(BoxError),
}

/// Errors that can occur while publishing an event.
#[derive(Error, Debug)]
pub enum PublishError {
    /// No event handlers are registered for the resolved event type.
    #[error("no event handlers registered for event type `{0}`")]
    NoHandlers(TypeKey),

    /// One or more event handlers failed.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Errors raised at registration time.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// The registration call was malformed.
    #[error("invalid registration: {0}")]
    Invalid(String),
}

/// A single failed event handler within a fan-out.
#[derive(Debug)]
pub struct HandlerFailure {
    handler: String,
    error: BoxError,
}

impl HandlerFailure {
    /// Record a failure for the named handler.
    pub fn new(handler: impl Into<String>, error: BoxError) -> Self {
        Self {
            handler: handler.into(),
            error,
        }
    }

    /// Name of the handler that failed.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// The underlying error.
    pub fn error(&self) -> &BoxError {
        &self.error
    }
}

/// The collected, encounter-ordered failures of an event fan-out.
///
/// Fan-out is fail-open: every handler runs even when earlier ones fail,
/// and all failures are aggregated here rather than short-circuiting.
#[derive(Debug)]
pub struct AggregateError {
    failures: Vec<HandlerFailure>,
}

impl AggregateError {
    /// Wrap a non-empty set of failures, preserving encounter order.
    pub fn new(failures: Vec<HandlerFailure>) -> Self {
        debug_assert!(!failures.is_empty());
        Self { failures }
    }

    /// The individual failures, in encounter order.
    pub fn failures(&self) -> &[HandlerFailure] {
        &self.failures
    }

    /// Number of handlers that failed.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Whether the set is empty. Always false for a constructed error.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} event handler(s) failed:", self.failures.len())?;
        for failure in &self.failures {
            write!(f, " [{}: {}]", failure.handler, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|f| f.error.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_display_lists_every_failure() {
        let err = AggregateError::new(vec![
            HandlerFailure::new("audit", "boom".into()),
            HandlerFailure::new("notify", "mail down".into()),
        ]);
        let rendered = err.to_string();
        assert!(rendered.contains("2 event handler(s) failed"));
        assert!(rendered.contains("audit: boom"));
        assert!(rendered.contains("notify: mail down"));
    }

    #[test]
    fn dispatch_error_messages() {
        let err = DispatchError::HandlerNotFound(TypeKey::of::<String>());
        assert!(err.to_string().contains("no handler registered"));

        let err = DispatchError::ResponseTypeMismatch {
            expected: "u32",
            actual: "String",
        };
        assert!(err.to_string().contains("expected `u32`"));
    }
}
