//! Error types for BOM graph operations.
//!
//! Two kinds of failure are distinguished:
//!
//! - **`Error`**: aborts the whole invocation (unreadable stream, missing
//!   column, unknown start node)
//! - **`ParseWarning`**: a single row that could not be used; collected
//!   alongside the ingested rows and never fatal
//!
//! `ErrorKind` sorts errors into input problems (the caller can fix them) and
//! internal problems, so an outer layer can map them onto its own status codes.

use thiserror::Error;

/// Result type for BOM graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The byte stream could not be read as a table
    #[error("{source_name}: unreadable input: {message}")]
    InputFormat {
        source_name: String,
        message: String,
    },

    /// A column the source shape requires is absent from the header row
    #[error("{source_name}: missing required column '{column}'")]
    Schema { source_name: String, column: String },

    /// The requested start identifier is not a node of the graph
    #[error("BOM ID {id} not found in the graph")]
    NotFound { id: String },

    /// Anything else
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Build an `InputFormat` error for a named source.
    pub fn input_format(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::InputFormat {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Build a `Schema` error naming the missing column.
    pub fn schema(source_name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            source_name: source_name.into(),
            column: column.into(),
        }
    }

    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InputFormat { .. } => ErrorKind::InputFormat,
            Self::Schema { .. } => ErrorKind::Schema,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Unexpected(format!("JSON: {err}"))
    }
}

/// Categorization of [`Error`] values.
///
/// Uses a 4xx/5xx style split:
/// - Input problems are issues with the uploaded tables or parameters
/// - Internal problems are everything else
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // === Input Problems (analogous to HTTP 4xx) ===
    InputFormat,
    Schema,
    NotFound,

    // === Internal Problems (analogous to HTTP 5xx) ===
    Unexpected,
}

impl ErrorKind {
    /// Returns `true` if this is an input problem (4xx-style).
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InputFormat | Self::Schema | Self::NotFound)
    }

    /// Returns `true` if this is an internal problem (5xx-style).
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::Unexpected)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputFormat => write!(f, "input format error"),
            Self::Schema => write!(f, "schema error"),
            Self::NotFound => write!(f, "not found"),
            Self::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// A row that was skipped (or partially used) during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Name of the source the row came from
    pub source_name: String,
    /// 1-indexed row number in the original table, header rows included
    pub row: usize,
    /// Human-readable explanation
    pub message: String,
}

impl ParseWarning {
    #[must_use]
    pub fn new(source_name: impl Into<String>, row: usize, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            row,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} row {}: {}", self.source_name, self.row, self.message)
    }
}
