//! Error types for indexgrid.
//!
//! Library crates use [`IndexGridError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all indexgrid operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexGridError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The grid provider could not turn a document into grids.
    #[error("grid extraction failed for {document}: {message}")]
    GridExtraction { document: String, message: String },

    /// No layout policy is registered for the document's year.
    #[error("no layout policy for year '{year}' ({document})")]
    UnrecognizedYear { document: String, year: String },

    /// The grids did not have the shape the layout policy expects.
    #[error("layout error in {document}: {message}")]
    Layout { document: String, message: String },

    /// A candidate string could not be parsed into a record.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Every document was processed and none produced a record.
    #[error("no index records extracted from {documents} document(s)")]
    NoRecordsExtracted { documents: usize },

    /// Serializing or writing the final table failed.
    #[error("output error: {0}")]
    Output(String),
}

/// Failure to parse one candidate string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no index identifier at start of '{candidate}'")]
    MissingIdentifier { candidate: String },

    #[error("no description matching '{pattern}' in '{candidate}'")]
    MissingDescription { candidate: String, pattern: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, IndexGridError>;

impl IndexGridError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a layout error for a document.
    pub fn layout(document: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Layout {
            document: document.into(),
            message: msg.into(),
        }
    }

    /// Create a grid extraction error for a document.
    pub fn grid_extraction(document: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::GridExtraction {
            document: document.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
