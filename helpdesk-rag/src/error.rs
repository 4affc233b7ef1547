//! Error types for the `helpdesk-rag` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while indexing a corpus or answering a question.
#[derive(Debug, Error)]
pub enum HelpdeskError {
    /// A required input path (e.g. the documents directory) does not exist.
    #[error("not found: {}", .path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// No persisted index exists at the storage path.
    ///
    /// Recoverable: callers may fall back to building a fresh index.
    #[error("no persisted index at {}", .path.display())]
    IndexNotFound {
        /// The storage path that was probed.
        path: PathBuf,
    },

    /// The persisted index exists but could not be read or is inconsistent.
    ///
    /// Unlike [`HelpdeskError::IndexNotFound`], this is not a fallback
    /// trigger: a corrupt index is surfaced to the caller verbatim.
    #[error("index error: {message}")]
    Index {
        /// A description of the failure.
        message: String,
    },

    /// An error from the embedding provider.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error from the chat model.
    #[error("generation error ({provider}): {message}")]
    Generation {
        /// The chat model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A question arrived before any index was built or loaded.
    #[error("no index is loaded; build or load an index first")]
    NotReady,

    /// A question arrived while the session was still answering another.
    #[error("session is busy answering another question")]
    Busy,

    /// An I/O error outside the persisted-index read path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience result type for Helpdesk operations.
pub type Result<T> = std::result::Result<T, HelpdeskError>;
