//! Unified error handling for the heureum crate
//!
//! Domain-specific errors ([`SourceError`], [`ClassifyError`], [`CsvError`])
//! stay usable on their own; this module wraps them into a single [`Error`]
//! enum for code that crosses module boundaries, with a category
//! classification for handling strategies.

use std::io;
use thiserror::Error;

pub use crate::classify::ClassifyError;
pub use crate::export::CsvError;
pub use crate::source::SourceError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Parsing and data extraction errors
    Parsing,
    /// Storage and I/O errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the heureum crate
#[derive(Error, Debug)]
pub enum Error {
    /// Interest source errors (fetch, decode)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Title classification errors
    #[error("Classify error: {0}")]
    Classify(#[from] ClassifyError),

    /// CSV import errors
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Source(e) => e.is_recoverable(),
            Self::Classify(_) => false,
            Self::Csv(_) => false,
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Http(_) => true,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Source(SourceError::Decode(_)) => ErrorCategory::Parsing,
            Self::Source(SourceError::InvalidEndpoint(_)) => ErrorCategory::Config,
            Self::Source(_) | Self::Http(_) => ErrorCategory::Network,
            Self::Classify(_) => ErrorCategory::Config,
            Self::Csv(CsvError::Io(_)) => ErrorCategory::Storage,
            Self::Csv(_) | Self::Json(_) => ErrorCategory::Parsing,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
