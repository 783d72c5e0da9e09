//! Typed errors for the panel library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while driving the panel.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Fetch operation failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Document extraction failed
    #[error("scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    /// No project name is configured in preferences
    #[error("no project configured")]
    NoProject,
}

/// Errors that can occur while fetching a document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success HTTP status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors that can occur while extracting records from a document.
///
/// `Display`/`Error` are implemented by hand (not via `#[derive(Error)]`)
/// because thiserror would treat the `source` field as an error source,
/// which `String` cannot be; the field name is part of the public API.
#[derive(Debug)]
pub enum ScrapeError {
    /// The document matches the tracker's not-found signature.
    ///
    /// This is a source-identification error, distinct from a listing
    /// with zero results (which is an ordinary empty extraction).
    SourceNotFound { source: String },
}

impl std::fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeError::SourceNotFound { source } => {
                write!(f, "source not found: {source}")
            }
        }
    }
}

impl std::error::Error for ScrapeError {}

/// Result type alias for panel operations.
pub type Result<T> = std::result::Result<T, PanelError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for scrape operations.
pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;
