//! Fetcher trait for pluggable document retrieval.
//!
//! The host sandbox's network primitive is request/response with no
//! automatic retry. The trait mirrors that contract: one call, one
//! settlement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;

/// A fetched document body before extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedDocument {
    /// URL the document was requested from
    pub url: String,

    /// Raw response body (HTML or feed XML)
    pub body: String,

    /// When the document was fetched
    pub fetched_at: DateTime<Utc>,
}

impl FetchedDocument {
    /// Create a document fetched now.
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Set the fetched timestamp.
    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Check if this document has a non-blank body.
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// Document fetcher seam.
///
/// Implementations settle exactly once per call, with no retry. The core
/// carries no timeout of its own: a fetcher whose future never resolves
/// stalls that cycle's completion barrier indefinitely. Production
/// implementations should carry their own transport timeout (as
/// [`crate::fetchers::HttpFetcher`] does) so a hung connection settles as
/// an error instead.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch one URL and return its body.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedDocument>;

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
