//! The aggregation and render driver.
//!
//! Owns the query state, the aggregate record set, and the cycle
//! generation counter. Every user action runs one full cycle: reset the
//! aggregate, fan out fetches, wait on the completion barrier, discard
//! the cycle if a newer one has started, then merge, sort, slice,
//! paginate, and hand the HTML to the host.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::error::Result;
use crate::paginate::{compute_pages, geometry_from_listing, page_controls, PageLink};
use crate::pipeline::orchestrate::{fetch_all_sources, SourceOutcome, SourceRequest};
use crate::recency::{compare_field, compare_recency};
use crate::render;
use crate::scrape::ListingMeta;
use crate::traits::fetcher::DocumentFetcher;
use crate::traits::host::HostPanel;
use crate::traits::prefs::PreferenceStore;
use crate::types::config::{pref_keys, PanelConfig};
use crate::types::query::{see_all_url, listing_url, Filter, PageEvent, QueryState};
use crate::types::record::Record;

/// Seconds a transient notice stays visible.
const NOTICE_SECONDS: u32 = 5;

/// How one driver call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle completed and the view was rendered.
    Rendered,

    /// A newer cycle started while this one was in flight; its settled
    /// responses were discarded without touching state or the display.
    Superseded,

    /// No resolvable project is configured; the enter-a-project prompt
    /// was rendered instead of a listing.
    ProjectPrompt,

    /// The event was rejected without starting a cycle (e.g. a
    /// user-scoped filter with no configured user name).
    Ignored,
}

/// Mutable panel state, owned by the driver.
///
/// The aggregate record set is reset at the start of every fetch cycle
/// so records from a superseded query can never leak into a later
/// render.
struct PanelState {
    config: PanelConfig,
    query: QueryState,
    records: Vec<Record>,
    meta: ListingMeta,
}

/// Drives the panel: one instance per widget.
///
/// Generic over the three collaborator seams so tests can run the whole
/// pipeline against mocks. All async suspension happens at the fetch
/// boundary; everything else is synchronous, and state is only touched
/// outside await points.
pub struct PanelDriver<F, P, H> {
    fetcher: F,
    prefs: P,
    host: H,
    generation: AtomicU64,
    state: Mutex<PanelState>,
}

impl<F, P, H> PanelDriver<F, P, H>
where
    F: DocumentFetcher,
    P: PreferenceStore,
    H: HostPanel,
{
    /// Create a driver with an explicit configuration.
    pub fn new(fetcher: F, prefs: P, host: H, config: PanelConfig) -> Self {
        let query = QueryState::new(Filter::All, config.sort.clone());
        Self {
            fetcher,
            prefs,
            host,
            generation: AtomicU64::new(0),
            state: Mutex::new(PanelState {
                config,
                query,
                records: Vec::new(),
                meta: ListingMeta::default(),
            }),
        }
    }

    /// Create a driver configured from the preference store.
    pub fn from_prefs(fetcher: F, prefs: P, host: H) -> Self {
        let config = PanelConfig::from_prefs(&prefs);
        Self::new(fetcher, prefs, host, config)
    }

    /// Initial load: pick up the persisted filter (guarded against
    /// user-scoped filters without a user name) and run the first cycle.
    pub async fn load(&self) -> Result<CycleOutcome> {
        let config = self.state.lock().unwrap().config.clone();
        if !config.has_project() {
            return Ok(self.render_project_prompt());
        }

        let (filter, downgraded) = config.initial_filter(&self.prefs);
        if downgraded {
            self.host
                .notify_transient(render::USER_NAME_REQUIRED_NOTICE, 4);
        }
        {
            let mut state = self.state.lock().unwrap();
            state.query = QueryState::new(filter, config.sort.clone());
        }
        self.run_cycle().await
    }

    /// Switch the active filter and start a fresh cycle on page 1.
    ///
    /// User-scoped filters without a configured user name are rejected
    /// with a transient notice and no cycle.
    pub async fn change_filter(&self, filter: Filter) -> Result<CycleOutcome> {
        {
            let mut state = self.state.lock().unwrap();
            if filter.requires_user() && state.config.user_name.is_empty() {
                drop(state);
                self.host
                    .notify_transient(render::USER_NAME_REQUIRED_NOTICE, 4);
                return Ok(CycleOutcome::Ignored);
            }
            state.query.filter = filter;
            state.query.page = 1;
        }
        self.prefs.set(pref_keys::ISSUE_TYPE, filter.as_pref());
        self.run_cycle().await
    }

    /// Handle a page navigation event.
    ///
    /// Single-source mode refetches with a new start offset (the source
    /// paginates server-side). Multi-source mode re-renders locally from
    /// the aggregate without another fetch.
    pub async fn change_page(&self, event: PageEvent) -> Result<CycleOutcome> {
        let single = {
            let mut state = self.state.lock().unwrap();
            state.query.apply(event);
            state.config.single_source()
        };
        if single {
            self.run_cycle().await
        } else {
            self.render_aggregate_window();
            Ok(CycleOutcome::Rendered)
        }
    }

    /// Store a new primary project (from the enter-a-project prompt) and
    /// reload.
    pub async fn set_project(&self, project: &str) -> Result<CycleOutcome> {
        let project = project.trim().to_lowercase();
        self.prefs.set(pref_keys::PROJECT, &project);
        {
            let mut state = self.state.lock().unwrap();
            state.config.project = project;
        }
        self.load().await
    }

    /// Snapshot of the current query state.
    pub fn query(&self) -> QueryState {
        self.state.lock().unwrap().query.clone()
    }

    /// Snapshot of the current aggregate record set.
    pub fn records(&self) -> Vec<Record> {
        self.state.lock().unwrap().records.clone()
    }

    /// The external full-listing URL behind the "see all" affordance.
    pub fn see_all_url(&self) -> String {
        let state = self.state.lock().unwrap();
        let start = if state.config.single_source() {
            // The panel shows at most four pages; the external view
            // picks up where they end.
            state.config.page_size * crate::paginate::PAGE_LINK_CAP
        } else {
            0
        };
        see_all_url(
            &state.config.project,
            &state.query,
            &state.config.user_name,
            start,
        )
    }

    /// Run one fetch-aggregate-render cycle for the current query.
    async fn run_cycle(&self) -> Result<CycleOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (config, query) = {
            let mut state = self.state.lock().unwrap();
            // Reset the aggregate before dispatch: stale records from a
            // superseded query must never survive into this render.
            state.records.clear();
            state.meta = ListingMeta::default();
            (state.config.clone(), state.query.clone())
        };
        if !config.has_project() {
            return Ok(self.render_project_prompt());
        }

        let requests = build_requests(&config, &query);
        debug!(
            generation,
            sources = requests.len(),
            filter = ?query.filter,
            page = query.page,
            "cycle dispatch"
        );

        let outcomes = fetch_all_sources(&self.fetcher, &requests).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "cycle superseded; discarding settled responses");
            return Ok(CycleOutcome::Superseded);
        }

        let mut records: Vec<Record> = Vec::new();
        let mut meta = ListingMeta::default();
        let mut primary_unresolved = false;
        for outcome in outcomes {
            match outcome {
                SourceOutcome::Loaded { source, listing } => {
                    if source == config.project {
                        meta = listing.meta.clone();
                    }
                    records.extend(listing.records);
                }
                SourceOutcome::NotFound { source } => {
                    if config.single_source() {
                        primary_unresolved = true;
                    } else {
                        self.host.notify_transient(
                            &render::unresolved_source_notice(&source),
                            NOTICE_SECONDS,
                        );
                    }
                }
                SourceOutcome::FetchFailed { source, .. } => {
                    self.host
                        .notify_transient(&render::fetch_failed_notice(&source), NOTICE_SECONDS);
                }
            }
        }

        if primary_unresolved {
            return Ok(self.render_project_prompt());
        }

        sort_records(&mut records, &query);

        let html = if config.single_source() {
            // Every fetched record belongs to the current page; geometry
            // comes from the source's own pagination block.
            let controls = geometry_from_listing(&meta, query.start_offset(), config.page_size)
                .map(|(geometry, current)| page_controls(geometry, current))
                .unwrap_or_default();
            compose(
                &render::record_table(&records, false),
                &controls,
                &self.see_all_for(&config, &query),
            )
        } else {
            let total = records.len() as u64;
            let geometry = compute_pages(total, config.page_size, query.page);
            let window = page_window(&records, query.page, config.page_size);
            compose(
                &render::record_table(window, true),
                &page_controls(geometry, query.page),
                &self.see_all_for(&config, &query),
            )
        };

        self.host.render(&html);
        self.host.request_resize();

        info!(
            generation,
            records = records.len(),
            "cycle rendered"
        );

        let mut state = self.state.lock().unwrap();
        state.records = records;
        state.meta = meta;
        Ok(CycleOutcome::Rendered)
    }

    /// Re-render the current page window from the stored aggregate
    /// (multi-source page navigation; no fetch).
    fn render_aggregate_window(&self) {
        let (records, query, config) = {
            let mut state = self.state.lock().unwrap();
            let total = state.records.len() as u64;
            let page_count = compute_pages(total, state.config.page_size, state.query.page)
                .page_count
                .max(1);
            state.query.page = state.query.page.min(page_count);
            (
                state.records.clone(),
                state.query.clone(),
                state.config.clone(),
            )
        };

        let total = records.len() as u64;
        let geometry = compute_pages(total, config.page_size, query.page);
        let window = page_window(&records, query.page, config.page_size);
        let html = compose(
            &render::record_table(window, true),
            &page_controls(geometry, query.page),
            &self.see_all_for(&config, &query),
        );
        self.host.render(&html);
        self.host.request_resize();
    }

    fn render_project_prompt(&self) -> CycleOutcome {
        self.host.render(&render::project_prompt_html());
        self.host.request_resize();
        CycleOutcome::ProjectPrompt
    }

    fn see_all_for(&self, config: &PanelConfig, query: &QueryState) -> String {
        let start = if config.single_source() {
            config.page_size * crate::paginate::PAGE_LINK_CAP
        } else {
            0
        };
        see_all_url(&config.project, query, &config.user_name, start)
    }
}

/// Build one fetch request per source for this cycle.
///
/// Single-source mode fetches exactly the current page; multi-source
/// mode fetches a deep window per source at offset zero and paginates
/// locally.
fn build_requests(config: &PanelConfig, query: &QueryState) -> Vec<SourceRequest> {
    let (num, start) = if config.single_source() {
        (config.page_size, query.start_offset())
    } else {
        (config.multi_fetch_window, 0)
    };
    config
        .sources()
        .into_iter()
        .map(|source| {
            let url = listing_url(&source, query, &config.user_name, num, start);
            SourceRequest { source, url }
        })
        .collect()
}

/// Sort the merged aggregate for display.
fn sort_records(records: &mut [Record], query: &QueryState) {
    if query.sort.is_date() {
        records.sort_by(|a, b| compare_recency(&a.sort_key, &b.sort_key));
    } else {
        records.sort_by(|a, b| compare_field(&a.sort_key, &b.sort_key));
    }
}

/// The slice of the aggregate visible on `page`.
fn page_window(records: &[Record], page: u64, page_size: u64) -> &[Record] {
    let start = ((page - 1) * page_size) as usize;
    if start >= records.len() {
        return &[];
    }
    let end = (start + page_size as usize).min(records.len());
    &records[start..end]
}

/// Assemble the final panel HTML: record table plus navigation control.
fn compose(body: &str, controls: &[PageLink], see_all: &str) -> String {
    let paging = render::paging_html(controls, see_all);
    if paging.is_empty() {
        body.to_string()
    } else {
        format!("{}<br />{}", body, paging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;
    use crate::testing::{MemoryPrefs, MockHost};

    fn listing_body(source: &str, rows: &[(&str, &str, &str)], total: Option<u64>) -> String {
        let mut html = format!(
            "<html><head><title> Issues - {} - Hosting </title></head><body>",
            source
        );
        if let Some(total) = total {
            html.push_str(&format!(
                "<div class=\"pagination\"> 1 - 10 of {} <a href=\"l?start=10\">Next</a></div>",
                total
            ));
        }
        html.push_str("<table id=\"resultstable\">");
        for (id, when, summary) in rows {
            html.push_str(&format!(
                "<tr><td>s</td><td>{}</td><td>{}</td><td>Defect</td><td>{}</td><td></td></tr>",
                id, when, summary
            ));
        }
        html.push_str("</table></body></html>");
        html
    }

    fn driver_for(
        mock: MockFetcher,
        prefs: MemoryPrefs,
        host: MockHost,
    ) -> PanelDriver<MockFetcher, MemoryPrefs, MockHost> {
        PanelDriver::from_prefs(mock, prefs, host)
    }

    #[tokio::test]
    async fn test_single_source_load_renders_records() {
        let body = listing_body(
            "alpha",
            &[("101", "3 days ago", "Fix crash"), ("102", "5 hours ago", "Typo")],
            Some(47),
        );
        let mock = MockFetcher::new().with_body("/p/alpha/", body);
        let prefs = MemoryPrefs::new().with(pref_keys::PROJECT, "alpha");
        let host = MockHost::new();

        let driver = driver_for(mock, prefs, host.clone());
        let outcome = driver.load().await.unwrap();

        assert_eq!(outcome, CycleOutcome::Rendered);
        let html = host.last_render().unwrap();
        assert!(html.contains("Fix crash"));
        // date sort puts the fresher record first
        let hours = html.find("Typo").unwrap();
        let days = html.find("Fix crash").unwrap();
        assert!(hours < days);
        // 47 items paginate
        assert!(html.contains("id='next'"));
        assert_eq!(host.resize_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_project_renders_prompt() {
        let driver = driver_for(MockFetcher::new(), MemoryPrefs::new(), MockHost::new());
        let outcome = driver.load().await.unwrap();
        assert_eq!(outcome, CycleOutcome::ProjectPrompt);
    }

    #[tokio::test]
    async fn test_primary_not_found_renders_prompt() {
        let not_found = "The requested URL <code>/p/alpha/issues/list</code> \
            was not found on this server.";
        let mock = MockFetcher::new().with_body("/p/alpha/", not_found);
        let prefs = MemoryPrefs::new().with(pref_keys::PROJECT, "alpha");
        let host = MockHost::new();

        let driver = driver_for(mock, prefs, host.clone());
        let outcome = driver.load().await.unwrap();

        assert_eq!(outcome, CycleOutcome::ProjectPrompt);
        assert!(host.last_render().unwrap().contains("projectName"));
    }

    #[tokio::test]
    async fn test_user_scoped_filter_without_user_is_ignored() {
        let body = listing_body("alpha", &[("1", "moments ago", "x")], None);
        let mock = MockFetcher::new().with_body("/p/alpha/", body);
        let prefs = MemoryPrefs::new().with(pref_keys::PROJECT, "alpha");
        let host = MockHost::new();

        let driver = driver_for(mock, prefs, host.clone());
        driver.load().await.unwrap();
        let fetches = driver.query();

        let outcome = driver.change_filter(Filter::AssignedToMe).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Ignored);
        assert_eq!(driver.query().filter, fetches.filter, "filter unchanged");
        assert_eq!(host.notice_count(), 1);
    }

    #[tokio::test]
    async fn test_filter_change_persists_preference_and_refetches() {
        let body = listing_body("alpha", &[("1", "moments ago", "x")], None);
        let mock = MockFetcher::new().with_body("/p/alpha/", body);
        let prefs = MemoryPrefs::new()
            .with(pref_keys::PROJECT, "alpha")
            .with(pref_keys::USER_NAME, "bob");
        let host = MockHost::new();

        let driver = driver_for(mock.clone(), prefs.clone(), host);
        driver.load().await.unwrap();
        let before = mock.call_count();

        driver.change_filter(Filter::AssignedToMe).await.unwrap();
        assert_eq!(prefs.get(pref_keys::ISSUE_TYPE).as_deref(), Some("assignedToMe"));
        assert_eq!(mock.call_count(), before + 1);
        assert!(mock.calls().last().unwrap().contains("owner%3Abob"));
        assert_eq!(driver.query().page, 1, "filter change resets to page 1");
    }

    #[tokio::test]
    async fn test_single_source_page_change_refetches_with_offset() {
        let body = listing_body("alpha", &[("1", "moments ago", "x")], Some(47));
        let mock = MockFetcher::new().with_body("/p/alpha/", body);
        let prefs = MemoryPrefs::new().with(pref_keys::PROJECT, "alpha");

        let driver = driver_for(mock.clone(), prefs, MockHost::new());
        driver.load().await.unwrap();

        driver.change_page(PageEvent::Next).await.unwrap();
        let last = mock.calls().last().unwrap().clone();
        assert!(last.contains("start=10"), "page 2 fetches offset 10: {}", last);
        assert!(last.contains("num=10"));
    }

    #[tokio::test]
    async fn test_zero_results_renders_no_results_message() {
        let body = "<html><head><title> Issues - alpha - Hosting </title></head>\
            <body>Your search did not generate any results.</body></html>";
        let mock = MockFetcher::new().with_body("/p/alpha/", body);
        let prefs = MemoryPrefs::new().with(pref_keys::PROJECT, "alpha");
        let host = MockHost::new();

        let driver = driver_for(mock, prefs, host.clone());
        let outcome = driver.load().await.unwrap();

        assert_eq!(outcome, CycleOutcome::Rendered, "zero results is not an error");
        assert!(host
            .last_render()
            .unwrap()
            .contains("There are no issues matching this query."));
        assert_eq!(host.notice_count(), 0);
    }

    #[tokio::test]
    async fn test_set_project_reloads() {
        let body = listing_body("alpha", &[("1", "moments ago", "x")], None);
        let mock = MockFetcher::new().with_body("/p/alpha/", body);
        let prefs = MemoryPrefs::new();
        let host = MockHost::new();

        let driver = driver_for(mock, prefs.clone(), host);
        assert_eq!(driver.load().await.unwrap(), CycleOutcome::ProjectPrompt);

        let outcome = driver.set_project("  Alpha ").await.unwrap();
        assert_eq!(outcome, CycleOutcome::Rendered);
        assert_eq!(prefs.get(pref_keys::PROJECT).as_deref(), Some("alpha"));
    }
}
