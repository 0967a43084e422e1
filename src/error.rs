//! Error types for preference storage and translation file loading.

use thiserror::Error;

/// Errors raised while persisting preferences or fetching translation files.
///
/// Fetch-side variants never reach the caller of a loader: the loaders
/// downgrade them to an empty mapping. They exist so the downgrade can be
/// logged with the real cause.
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The preference store could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// The HTTP request for a translation file failed
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("Translation file {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The file body is not a JSON object
    #[error("Translation file {url} is not a JSON object: {message}")]
    Parse { url: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for this crate's fallible operations
pub type Result<T> = std::result::Result<T, TranslationError>;
