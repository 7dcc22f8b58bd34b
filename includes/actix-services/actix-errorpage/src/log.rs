//! [`ErrorLog`] Implementation and Utilities
use std::fmt;

/// Single error-level log record produced by [`ErrorHandler`](crate::ErrorHandler).
pub struct LogEntry<'a> {
    /// `Error occurred processing <METHOD> <URL>: <message>`
    pub message: String,
    pub url: &'a str,
    pub method: &'a str,
    pub error: &'a dyn fmt::Debug,
}

impl<'a> LogEntry<'a> {
    pub(crate) fn new<E>(method: &'a str, url: &'a str, error: &'a E) -> Self
    where
        E: fmt::Display + fmt::Debug,
    {
        Self {
            message: format!("Error occurred processing {method} {url}: {error}"),
            url,
            method,
            error,
        }
    }
}

/// Destination for errors captured by the [`ErrorHandler`](crate::ErrorHandler).
///
/// Every captured error is passed here exactly once, before any
/// attempt is made to write an error response.
pub trait ErrorLog {
    fn error(&self, entry: &LogEntry<'_>);
}

impl<F> ErrorLog for F
where
    F: Fn(&LogEntry<'_>),
{
    #[inline]
    fn error(&self, entry: &LogEntry<'_>) {
        self(entry)
    }
}

/// Default [`ErrorLog`] emitting `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ErrorLog for TracingLog {
    fn error(&self, entry: &LogEntry<'_>) {
        tracing::error!(
            url = entry.url,
            method = entry.method,
            error = ?entry.error,
            "{}",
            entry.message
        );
    }
}
