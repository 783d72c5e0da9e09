//! Issue-Tracker Summary Panel Library
//!
//! A read-only summary panel for a sandboxed embeddable widget: fetches
//! issue listings from one or more tracker projects, extracts structured
//! records from the semi-structured markup, merges them, orders them with
//! a heuristic relative-time comparator (the tracker exposes no absolute
//! timestamps), and serves a bounded, paginated view.
//!
//! # Design
//!
//! - The host sandbox's primitives (network fetch, preference store,
//!   display region, transient notices, resize) are trait seams in
//!   [`traits`]; the core never touches them directly.
//! - One user action runs one cycle: reset → fan out fetches → completion
//!   barrier → merge → sort → slice → paginate → render. Cycles are
//!   generation-tagged so responses from a superseded cycle are discarded
//!   instead of corrupting a newer one.
//! - Extraction is tolerant by contract: rows missing required fields are
//!   dropped, zero results is a normal empty listing, and only the
//!   tracker's not-found signature counts as a source error.
//!
//! # Usage
//!
//! ```rust,ignore
//! use issue_panel::{HttpFetcher, PanelDriver};
//!
//! let driver = PanelDriver::from_prefs(HttpFetcher::new(), prefs, host);
//! driver.load().await?;
//! // later, wired to the rendered controls:
//! driver.change_page(PageEvent::Next).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (fetcher, host panel, preferences)
//! - [`types`] - Records, query state, configuration
//! - [`recency`] - Heuristic relative-time comparator
//! - [`scrape`] - Record extraction from listing HTML and update feeds
//! - [`paginate`] - Page geometry and navigation control descriptors
//! - [`render`] - HTML rendering of the merged view
//! - [`pipeline`] - Fetch orchestration and the aggregation driver
//! - [`fetchers`] - Fetcher implementations (HTTP, mock)
//! - [`testing`] - Mock host and preference store for tests

pub mod error;
pub mod fetchers;
pub mod paginate;
pub mod pipeline;
pub mod recency;
pub mod render;
pub mod scrape;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{FetchError, PanelError, Result, ScrapeError};
pub use traits::{
    fetcher::{DocumentFetcher, FetchedDocument},
    host::HostPanel,
    prefs::PreferenceStore,
};
pub use types::{
    config::{pref_keys, PanelConfig},
    query::{
        detail_url, listing_url, see_all_url, Filter, PageEvent, QueryState, SortMode,
        MULTI_FETCH_WINDOW, PAGE_SIZE,
    },
    record::Record,
};

// Re-export the comparator and extractor entry points
pub use recency::{classify, compare_field, compare_recency, RecencyBucket};
pub use scrape::{parse_feed, parse_listing, Listing, ListingMeta};

// Re-export pagination
pub use paginate::{
    compute_pages, geometry_from_listing, page_controls, PageGeometry, PageLink, PAGE_LINK_CAP,
};

// Re-export the pipeline
pub use pipeline::{fetch_all_sources, CycleOutcome, PanelDriver, SourceOutcome, SourceRequest};

// Re-export fetchers
pub use fetchers::{HttpFetcher, MockFetcher};

// Re-export testing utilities
pub use testing::{MemoryPrefs, MockHost};
