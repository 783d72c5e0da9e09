//! Fan-out fetching with a completion barrier.
//!
//! One fetch per source, all in flight concurrently, each handled
//! independently of the others' timing or outcome. The awaited join is
//! the completion barrier: it settles only when every source has settled,
//! successes and recognized errors alike. No timeout or retry lives
//! here; a fetcher that never resolves stalls the barrier (see
//! [`crate::traits::fetcher::DocumentFetcher`]).

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::{FetchError, ScrapeError};
use crate::scrape::{parse_listing, Listing};
use crate::traits::fetcher::DocumentFetcher;

/// One source's fetch request for a cycle.
#[derive(Debug, Clone)]
pub struct SourceRequest {
    /// Source project slug
    pub source: String,
    /// Fully built listing URL
    pub url: String,
}

/// How one source settled.
#[derive(Debug)]
pub enum SourceOutcome {
    /// Fetched and extracted.
    Loaded { source: String, listing: Listing },

    /// The document matched the not-found signature: the source does
    /// not resolve. Contributes zero records.
    NotFound { source: String },

    /// Transport-level failure from the fetcher. Contributes zero
    /// records.
    FetchFailed { source: String, error: FetchError },
}

impl SourceOutcome {
    /// The source this outcome belongs to.
    pub fn source(&self) -> &str {
        match self {
            SourceOutcome::Loaded { source, .. } => source,
            SourceOutcome::NotFound { source } => source,
            SourceOutcome::FetchFailed { source, .. } => source,
        }
    }

    /// Whether the source settled with records available.
    pub fn is_loaded(&self) -> bool {
        matches!(self, SourceOutcome::Loaded { .. })
    }
}

/// Fetch every source concurrently and wait for all of them to settle.
///
/// The returned outcomes are in request order regardless of response
/// order, so callers must not read any inter-source timing out of them.
pub async fn fetch_all_sources<F: DocumentFetcher>(
    fetcher: &F,
    requests: &[SourceRequest],
) -> Vec<SourceOutcome> {
    debug!(sources = requests.len(), "dispatching source fetches");

    let futures = requests.iter().map(|request| async move {
        match fetcher.fetch(&request.url).await {
            Ok(document) => match parse_listing(&document.body, &request.source) {
                Ok(listing) => {
                    debug!(
                        source = %request.source,
                        records = listing.records.len(),
                        "source settled with records"
                    );
                    SourceOutcome::Loaded {
                        source: request.source.clone(),
                        listing,
                    }
                }
                Err(ScrapeError::SourceNotFound { source }) => {
                    warn!(source = %source, "source does not resolve");
                    SourceOutcome::NotFound { source }
                }
            },
            Err(error) => {
                warn!(source = %request.source, error = %error, "source fetch failed");
                SourceOutcome::FetchFailed {
                    source: request.source.clone(),
                    error,
                }
            }
        }
    });

    // Completion barrier: settles once per cycle, after every source.
    join_all(futures).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;

    fn request(source: &str) -> SourceRequest {
        SourceRequest {
            source: source.to_string(),
            url: format!("http://code.google.com/p/{}/issues/list?can=1", source),
        }
    }

    #[tokio::test]
    async fn test_barrier_closes_with_mixed_outcomes() {
        let listing = "<html><head><title> Issues - alpha - Hosting </title></head>\
            <table id=\"resultstable\">\
            <tr><td>s</td><td>1</td><td>3 days ago</td><td>Defect</td><td>Fix</td><td></td></tr>\
            </table></html>";
        let not_found = "The requested URL <code>/p/beta/issues/list</code> \
            was not found on this server.";

        let mock = MockFetcher::new()
            .with_body("/p/alpha/", listing)
            .with_body("/p/beta/", not_found)
            .with_failure("/p/gamma/");

        let outcomes = fetch_all_sources(
            &mock,
            &[request("alpha"), request("beta"), request("gamma")],
        )
        .await;

        assert_eq!(outcomes.len(), 3, "barrier waits for every source");
        assert!(outcomes[0].is_loaded());
        assert!(matches!(&outcomes[1], SourceOutcome::NotFound { source } if source == "beta"));
        assert!(
            matches!(&outcomes[2], SourceOutcome::FetchFailed { source, .. } if source == "gamma")
        );
    }

    #[tokio::test]
    async fn test_outcomes_keep_request_order() {
        let body = |name: &str| {
            format!(
                "<html><head><title> Issues - {} - Hosting </title></head>\
                <table id=\"resultstable\"></table></html>",
                name
            )
        };
        let mock = MockFetcher::new()
            .with_body("/p/slow/", body("slow"))
            .with_body("/p/fast/", body("fast"))
            .with_delay("/p/slow/", std::time::Duration::from_millis(30));

        let outcomes = fetch_all_sources(&mock, &[request("slow"), request("fast")]).await;
        assert_eq!(outcomes[0].source(), "slow");
        assert_eq!(outcomes[1].source(), "fast");
    }
}
