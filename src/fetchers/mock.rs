//! Mock fetcher for testing.
//!
//! Provides canned responses keyed by URL fragment, configurable
//! failures and delays, and call tracking for assertions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{DocumentFetcher, FetchedDocument};

/// Mock fetcher with canned responses.
///
/// Bodies are keyed by URL fragment: a fetch matches the first entry
/// whose key is a substring of the requested URL (exact matches win),
/// so tests can key on a project slug without reproducing full query
/// strings.
///
/// # Example
///
/// ```rust,ignore
/// let mock = MockFetcher::new()
///     .with_body("/p/alpha/", alpha_listing_html)
///     .with_failure("/p/beta/");
/// ```
#[derive(Default)]
pub struct MockFetcher {
    /// Canned bodies by URL fragment, in insertion order
    bodies: Arc<RwLock<Vec<(String, String)>>>,
    /// URL fragments that fail with a transport error
    failures: Arc<RwLock<Vec<String>>>,
    /// Per-fragment delay before settling
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Requested URLs, for verification
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canned body for URLs containing `fragment`.
    pub fn add_body(&self, fragment: impl Into<String>, body: impl Into<String>) {
        self.bodies
            .write()
            .unwrap()
            .push((fragment.into(), body.into()));
    }

    /// Builder form of [`MockFetcher::add_body`].
    pub fn with_body(self, fragment: impl Into<String>, body: impl Into<String>) -> Self {
        self.add_body(fragment, body);
        self
    }

    /// Fail fetches for URLs containing `fragment` with a transport
    /// error.
    pub fn with_failure(self, fragment: impl Into<String>) -> Self {
        self.failures.write().unwrap().push(fragment.into());
        self
    }

    /// Delay settling for URLs containing `fragment`.
    pub fn with_delay(self, fragment: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(fragment.into(), delay);
        self
    }

    /// URLs requested so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of fetches issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Clear recorded calls.
    pub fn reset_calls(&self) {
        self.calls.write().unwrap().clear();
    }

    fn lookup(&self, url: &str) -> Option<String> {
        let bodies = self.bodies.read().unwrap();
        bodies
            .iter()
            .find(|(fragment, _)| fragment == url)
            .or_else(|| bodies.iter().find(|(fragment, _)| url.contains(fragment)))
            .map(|(_, body)| body.clone())
    }
}

impl Clone for MockFetcher {
    fn clone(&self) -> Self {
        Self {
            bodies: Arc::clone(&self.bodies),
            failures: Arc::clone(&self.failures),
            delays: Arc::clone(&self.delays),
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl DocumentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedDocument> {
        self.calls.write().unwrap().push(url.to_string());

        let delay = self
            .delays
            .read()
            .unwrap()
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failed = self
            .failures
            .read()
            .unwrap()
            .iter()
            .any(|fragment| url.contains(fragment));
        if failed {
            return Err(FetchError::Http(
                format!("mock failure for {}", url).into(),
            ));
        }

        match self.lookup(url) {
            Some(body) => Ok(FetchedDocument::new(url, body)),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fragment_matching() {
        let mock = MockFetcher::new().with_body("/p/alpha/", "alpha body");

        let doc = mock
            .fetch("http://code.google.com/p/alpha/issues/list?can=1")
            .await
            .unwrap();
        assert_eq!(doc.body, "alpha body");

        let missing = mock.fetch("http://code.google.com/p/other/").await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_mock_failure_and_call_tracking() {
        let mock = MockFetcher::new()
            .with_body("/p/alpha/", "ok")
            .with_failure("/p/beta/");

        assert!(mock.fetch("http://x/p/alpha/list").await.is_ok());
        assert!(mock.fetch("http://x/p/beta/list").await.is_err());
        assert_eq!(mock.call_count(), 2);
        assert!(mock.calls()[1].contains("beta"));
    }
}
