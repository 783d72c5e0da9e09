//! Query state - filter, sort, page, and the fetch URLs derived from them.

use serde::{Deserialize, Serialize};
use url::Url;

/// Records shown per page.
pub const PAGE_SIZE: u64 = 10;

/// Items fetched per source in multi-source mode.
///
/// One more than four full pages, so the aggregate can tell "exactly four
/// pages" apart from "more results exist beyond the display cap".
pub const MULTI_FETCH_WINDOW: u64 = 41;

/// The fixed set of listing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    All,
    Starred,
    AssignedToMe,
    ReportedByMe,
}

impl Filter {
    /// Parse the preference-store representation; unknown values fall
    /// back to [`Filter::All`].
    pub fn from_pref(value: &str) -> Self {
        match value {
            "starred" => Filter::Starred,
            "assignedToMe" => Filter::AssignedToMe,
            "reportedByMe" => Filter::ReportedByMe,
            _ => Filter::All,
        }
    }

    /// Preference-store representation of this filter.
    pub fn as_pref(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Starred => "starred",
            Filter::AssignedToMe => "assignedToMe",
            Filter::ReportedByMe => "reportedByMe",
        }
    }

    /// Whether this filter needs a configured user name to build its query.
    pub fn requires_user(&self) -> bool {
        matches!(self, Filter::AssignedToMe | Filter::ReportedByMe)
    }

    /// Tracker query string for this filter, or `None` for the
    /// unfiltered listing.
    pub fn query(&self, user: &str) -> Option<String> {
        match self {
            Filter::All => None,
            Filter::Starred => Some("is:starred".to_string()),
            Filter::AssignedToMe => Some(format!("owner:{}", user)),
            Filter::ReportedByMe => Some(format!("reporter:{}", user)),
        }
    }
}

/// The active sort column, e.g. `-modified` (descending by modified time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortMode {
    /// Column name without direction prefix.
    pub key: String,
    /// Leading `-` in the tracker's sort syntax.
    pub descending: bool,
}

impl SortMode {
    /// Parse the tracker's sort syntax (`modified` or `-modified`).
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix('-') {
            Some(key) => Self {
                key: key.to_string(),
                descending: true,
            },
            None => Self {
                key: spec.to_string(),
                descending: false,
            },
        }
    }

    /// Sort parameter in the tracker's syntax.
    pub fn param(&self) -> String {
        if self.descending {
            format!("-{}", self.key)
        } else {
            self.key.clone()
        }
    }

    /// Column spec sent to the tracker: id, the sort column, summary.
    pub fn column_spec(&self) -> String {
        format!("ID {} Summary", self.key)
    }

    /// Whether the sort column holds relative-time text, which selects
    /// the heuristic recency comparator instead of the lexicographic one.
    pub fn is_date(&self) -> bool {
        matches!(
            self.key.to_lowercase().as_str(),
            "opened" | "modified" | "closed"
        )
    }
}

impl Default for SortMode {
    fn default() -> Self {
        Self::parse("-modified")
    }
}

/// Navigation events emitted by the page controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageEvent {
    Prev,
    Next,
    Page(u64),
}

/// The current query: filter, 1-based page, sort column.
///
/// Mutated only by user-initiated filter or page events, never mid-fetch;
/// the driver snapshots it at the start of every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub filter: Filter,
    pub page: u64,
    pub sort: SortMode,
}

impl QueryState {
    /// Create a query on page 1.
    pub fn new(filter: Filter, sort: SortMode) -> Self {
        Self {
            filter,
            page: 1,
            sort,
        }
    }

    /// Zero-based record offset of the current page.
    pub fn start_offset(&self) -> u64 {
        (self.page - 1) * PAGE_SIZE
    }

    /// Apply a navigation event, clamping the page to at least 1.
    pub fn apply(&mut self, event: PageEvent) {
        self.page = match event {
            PageEvent::Prev => self.page.saturating_sub(1).max(1),
            PageEvent::Next => self.page + 1,
            PageEvent::Page(n) => n.max(1),
        };
    }
}

/// Build the listing fetch URL for one source project.
///
/// `num`/`start` select the fetch window: one page in single-source mode,
/// the deep [`MULTI_FETCH_WINDOW`] in multi-source mode.
pub fn listing_url(project: &str, query: &QueryState, user: &str, num: u64, start: u64) -> String {
    let mut url = base_listing(project);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("can", "1");
        pairs.append_pair("sort", &query.sort.param());
        pairs.append_pair("colspec", &query.sort.column_spec());
        pairs.append_pair("num", &num.to_string());
        pairs.append_pair("start", &start.to_string());
        if let Some(q) = query.filter.query(user) {
            pairs.append_pair("q", &q);
        }
    }
    url.to_string()
}

/// Build the external, un-paginated "see all" URL for a project.
///
/// Carries sort and filter but no column spec or fetch window, so the
/// tracker's own full listing view takes over.
pub fn see_all_url(project: &str, query: &QueryState, user: &str, start: u64) -> String {
    let mut url = base_listing(project);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("can", "1");
        pairs.append_pair("sort", &query.sort.param());
        pairs.append_pair("start", &start.to_string());
        if let Some(q) = query.filter.query(user) {
            pairs.append_pair("q", &q);
        }
    }
    url.to_string()
}

/// Issue detail URL for one record.
pub fn detail_url(project: &str, id: &str) -> String {
    format!(
        "http://code.google.com/p/{}/issues/detail?id={}",
        project, id
    )
}

fn base_listing(project: &str) -> Url {
    let base = format!("http://code.google.com/p/{}/issues/list", project);
    // The project slug is validated/lowercased at preference load; a slug
    // that still fails to parse would produce an unfetchable URL either way.
    Url::parse(&base).unwrap_or_else(|_| {
        Url::parse("http://code.google.com/p/invalid/issues/list").unwrap()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_pref_round_trip() {
        for filter in [
            Filter::All,
            Filter::Starred,
            Filter::AssignedToMe,
            Filter::ReportedByMe,
        ] {
            assert_eq!(Filter::from_pref(filter.as_pref()), filter);
        }
        assert_eq!(Filter::from_pref("garbage"), Filter::All);
    }

    #[test]
    fn test_filter_queries() {
        assert_eq!(Filter::All.query("bob"), None);
        assert_eq!(Filter::Starred.query("bob"), Some("is:starred".into()));
        assert_eq!(Filter::AssignedToMe.query("bob"), Some("owner:bob".into()));
        assert_eq!(
            Filter::ReportedByMe.query("bob"),
            Some("reporter:bob".into())
        );
        assert!(Filter::AssignedToMe.requires_user());
        assert!(!Filter::Starred.requires_user());
    }

    #[test]
    fn test_sort_mode_parse() {
        let sort = SortMode::parse("-modified");
        assert_eq!(sort.key, "modified");
        assert!(sort.descending);
        assert_eq!(sort.param(), "-modified");
        assert_eq!(sort.column_spec(), "ID modified Summary");
        assert!(sort.is_date());

        let sort = SortMode::parse("summary");
        assert!(!sort.descending);
        assert!(!sort.is_date());
    }

    #[test]
    fn test_query_state_paging() {
        let mut query = QueryState::new(Filter::All, SortMode::default());
        assert_eq!(query.page, 1);
        assert_eq!(query.start_offset(), 0);

        query.apply(PageEvent::Next);
        assert_eq!(query.page, 2);
        assert_eq!(query.start_offset(), 10);

        query.apply(PageEvent::Prev);
        query.apply(PageEvent::Prev);
        assert_eq!(query.page, 1, "prev clamps at page 1");

        query.apply(PageEvent::Page(4));
        assert_eq!(query.page, 4);
    }

    #[test]
    fn test_listing_url() {
        let query = QueryState::new(Filter::Starred, SortMode::default());
        let url = listing_url("alpha", &query, "", 10, 20);
        assert!(url.starts_with("http://code.google.com/p/alpha/issues/list?"));
        assert!(url.contains("can=1"));
        assert!(url.contains("sort=-modified"));
        assert!(url.contains("num=10"));
        assert!(url.contains("start=20"));
        assert!(url.contains("q=is%3Astarred"));
    }

    #[test]
    fn test_query_state_serializes_for_host() {
        let query = QueryState::new(Filter::Starred, SortMode::default());
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"starred\""));
        let back: QueryState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }

    #[test]
    fn test_see_all_url_strips_window() {
        let query = QueryState::new(Filter::All, SortMode::default());
        let url = see_all_url("alpha", &query, "", 40);
        assert!(!url.contains("colspec"));
        assert!(!url.contains("num="));
        assert!(url.contains("start=40"));
    }
}
