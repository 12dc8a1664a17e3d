//! Error types for repository and datastore operations

use std::error::Error;
use std::fmt;

/// Boxed error type for error sources
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store operation error with rich diagnostics
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub struct StoreError {
    kind: StoreErrorKind,
    #[source]
    source: Option<BoxError>,
    #[help]
    help: Option<String>,
    context: Option<String>,
}

/// Error categories for store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// I/O error
    Io,
    /// Key or repository not found
    NotFound,
    /// Repository is locked by another process
    Locked,
    /// Key cannot be used with this datastore
    InvalidKey,
    /// Datastore spec is malformed or inconsistent with disk
    InvalidSpec,
    /// Datastore type is not supported
    Unsupported,
    /// No mount covers the key
    NoMount,
    /// Serialization/deserialization failed
    Serialization,
}

impl StoreError {
    /// Create a new error with the given kind and optional source
    pub fn new(kind: StoreErrorKind, source: Option<BoxError>) -> Self {
        Self {
            kind,
            source,
            help: None,
            context: None,
        }
    }

    /// Add a help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add context information to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> &StoreErrorKind {
        &self.kind
    }

    // Constructors for different error kinds

    /// Create an I/O error
    pub fn io(source: impl Error + Send + Sync + 'static) -> Self {
        Self::new(StoreErrorKind::Io, Some(Box::new(source)))
    }

    /// Create a not found error
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::new(StoreErrorKind::NotFound, None)
            .with_context(format!("{} not found: {}", resource, id))
    }

    /// Create a lock contention error
    pub fn locked(path: impl fmt::Display) -> Self {
        Self::new(
            StoreErrorKind::Locked,
            Some("ipfs daemon is running. please stop it to run this command".into()),
        )
        .with_context(format!("repo: {}", path))
        .with_help("Stop the running daemon before reading or writing the datastore directly")
    }

    /// Create an invalid key error
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::InvalidKey, Some(reason.into().into()))
            .with_context(format!("key: {}", key.into()))
    }

    /// Create an invalid datastore spec error
    pub fn invalid_spec(msg: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::InvalidSpec, Some(msg.into().into()))
    }

    /// Create an unsupported datastore error
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unsupported, None)
            .with_context(format!("datastore type: {}", what.into()))
            .with_help("Supported datastore types are mount, measure, flatfs, levelds and mem")
    }

    /// Create a no-mount error
    pub fn no_mount(key: impl fmt::Display) -> Self {
        Self::new(StoreErrorKind::NoMount, None)
            .with_context(format!("no datastore mounted for key: {}", key))
    }

    /// Create a serialization error
    pub fn serialization(source: impl Error + Send + Sync + 'static) -> Self {
        Self::new(StoreErrorKind::Serialization, Some(Box::new(source)))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;

        if let Some(ctx) = &self.context {
            write!(f, ": {}", ctx)?;
        }

        if let Some(src) = &self.source {
            write!(f, ": {}", src)?;
        }

        Ok(())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::io(e)
    }
}
