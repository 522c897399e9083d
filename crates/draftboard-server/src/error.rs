//! Service layer error types.
//!
//! Errors raised while building the [`ServiceState`] and its dependencies,
//! before any request is served.
//!
//! [`ServiceState`]: crate::service::ServiceState

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing service layer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Configuration-related errors.
    Config,
    /// External service communication errors.
    External,
    /// Authentication key setup errors.
    Auth,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::External => "external_service",
            Self::Auth => "auth",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service layer error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates an error for a failed call to an external service.
    #[inline]
    pub fn external(service: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::External, format!("{service}: {message}"))
    }

    /// Creates an authentication setup error.
    #[inline]
    pub fn auth(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Config.to_string(), "config");
        assert_eq!(ErrorKind::External.to_string(), "external_service");
        assert_eq!(ErrorKind::Auth.to_string(), "auth");
    }

    #[test]
    fn error_constructors() {
        let error = Error::external("postgres", "connection refused");
        assert_eq!(error.kind(), ErrorKind::External);
        assert_eq!(error.message(), "postgres: connection refused");

        let error = Error::auth("secret is empty");
        assert_eq!(error.to_string(), "auth error: secret is empty");
    }

    #[test]
    fn error_with_source() {
        let io = std::io::Error::other("disk on fire");
        let error = Error::external("postgres", "failed to apply migrations").with_source(io);
        assert!(error.source().is_some());
    }
}
