//! Error types for jarstore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using JarError
pub type Result<T> = std::result::Result<T, JarError>;

/// Unified error type for jarstore operations
#[derive(Debug, Error)]
pub enum JarError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt log record at line {line}: {source}")]
    CorruptRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    // -------------------------------------------------------------------------
    // Cookie Domain Errors
    // -------------------------------------------------------------------------
    #[error("illegal cookie domain attribute: {0}")]
    IllegalDomain(String),

    #[error("malformed cookie domain attribute: {0}")]
    MalformedDomain(String),

    #[error("no host name available (IP only): {0}")]
    NoHostname(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Replica task {0} panicked")]
    ReplicaPanicked(usize),

    // -------------------------------------------------------------------------
    // Context
    // -------------------------------------------------------------------------
    #[error("{op}({subject}): {source}")]
    Context {
        op: &'static str,
        subject: String,
        #[source]
        source: Box<JarError>,
    },
}

impl JarError {
    /// Whether this error came from reading or writing persisted state.
    pub fn is_io(&self) -> bool {
        match self {
            JarError::Io(_) | JarError::CorruptRecord { .. } | JarError::Encode(_) => true,
            JarError::Context { source, .. } => source.is_io(),
            _ => false,
        }
    }

    /// Whether this error is a rejected `Domain` attribute.
    pub fn is_domain_rejection(&self) -> bool {
        match self {
            JarError::IllegalDomain(_) | JarError::MalformedDomain(_) | JarError::NoHostname(_) => true,
            JarError::Context { source, .. } => source.is_domain_rejection(),
            _ => false,
        }
    }

    /// Innermost error, with all context layers removed.
    pub fn root(&self) -> &JarError {
        match self {
            JarError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attach the failing operation and its key/id to an error.
pub trait ResultExt<T> {
    fn context(self, op: &'static str, subject: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<JarError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, op: &'static str, subject: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| JarError::Context {
            op,
            subject: subject.to_string(),
            source: Box::new(e.into()),
        })
    }
}
