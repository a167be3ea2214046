//! Error handling for the git-migrate crate.
use std::{error::Error as StdError, fmt};

/// Error type for the git-migrate crate.
#[derive(Debug)]
pub struct MigrateError {
    /// Inner error.
    inner: Box<Inner>,
}

impl MigrateError {
    /// Create a new error.
    pub(crate) fn new(kind: MigrateErrorKind) -> Self {
        Self {
            inner: Box::new(Inner { kind, source: None }),
        }
    }

    /// Attach a text message as the source of the error.
    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.inner.source = Some(Box::new(std::io::Error::other(text)));
        self
    }

    /// Attach a source error.
    pub(crate) fn with_source<E: Into<BoxError>>(mut self, source: E) -> Self {
        self.inner.source = Some(source.into());
        self
    }

    /// Kind of the error
    pub fn kind(&self) -> &MigrateErrorKind {
        &self.inner.kind
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the git-migrate crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: MigrateErrorKind,

    /// Source error.
    source: Option<BoxError>,
}

/// Kinds of [`MigrateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateErrorKind {
    /// Malformed task parameters, rejected before anything runs.
    InvalidInput,

    /// The git executable could not be launched.
    Spawn,

    /// Missing or conflicting configuration.
    Config,

    /// Filesystem or terminal error.
    Io,

    /// Error related to serde.
    Serde,
}

impl fmt::Display for MigrateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrateErrorKind::InvalidInput => write!(f, "invalid input"),
            MigrateErrorKind::Spawn => write!(f, "unable to launch git"),
            MigrateErrorKind::Config => write!(f, "configuration error"),
            MigrateErrorKind::Io => write!(f, "io error"),
            MigrateErrorKind::Serde => write!(f, "serialization error"),
        }
    }
}

impl fmt::Display for MigrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.source {
            Some(source) => write!(f, "{}: {}", self.inner.kind, source),
            None => write!(f, "{}", self.inner.kind),
        }
    }
}

impl StdError for MigrateError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<std::io::Error> for MigrateError {
    fn from(e: std::io::Error) -> Self {
        Self::new(MigrateErrorKind::Io).with_source(e)
    }
}

impl From<toml::de::Error> for MigrateError {
    fn from(e: toml::de::Error) -> Self {
        Self::new(MigrateErrorKind::Config).with_source(e)
    }
}

impl From<serde_json::Error> for MigrateError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(MigrateErrorKind::Serde).with_source(e)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_includes_source() {
        let err = MigrateError::new(MigrateErrorKind::InvalidInput).with_text("empty host");
        assert_eq!(err.to_string(), "invalid input: empty host");
        assert!(err.source().is_some());
        assert_eq!(err.kind(), &MigrateErrorKind::InvalidInput);
    }

    #[test]
    fn io_error_conversion() {
        let err: MigrateError = std::io::Error::other("disk full").into();
        assert_eq!(err.kind(), &MigrateErrorKind::Io);
        assert_eq!(err.to_string(), "io error: disk full");
    }
}
