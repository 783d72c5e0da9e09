//! End-to-end panel scenarios against mock collaborators.

use std::time::Duration;

use issue_panel::{
    pref_keys, CycleOutcome, Filter, MemoryPrefs, MockFetcher, MockHost, PageEvent, PanelDriver,
    PreferenceStore,
};

fn listing_body(source: &str, rows: &[(u32, &str, &str)]) -> String {
    let mut html = format!(
        "<html><head><title> Issues - {} - Project Hosting </title></head><body>",
        source
    );
    html.push_str("<table id=\"resultstable\">");
    for (id, when, summary) in rows {
        html.push_str(&format!(
            "<tr><td>star</td><td>{}</td><td>{}</td><td>Defect</td><td>{}</td><td></td></tr>",
            id, when, summary
        ));
    }
    html.push_str("</table></body></html>");
    html
}

fn not_found_body(source: &str) -> String {
    format!(
        "The requested URL <code>/p/{}/issues/list</code> was not found on this server.",
        source
    )
}

fn multi_project_prefs(primary: &str, others: &str) -> MemoryPrefs {
    let prefs = MemoryPrefs::new();
    prefs.set(pref_keys::PROJECT, primary);
    prefs.set(pref_keys::OTHER_PROJECTS, others);
    prefs
}

#[tokio::test]
async fn one_unresolvable_source_yields_one_notice_and_zero_records() {
    let mock = MockFetcher::new()
        .with_body(
            "/p/alpha/",
            listing_body("alpha", &[(1, "3 hours ago", "Alpha issue")]),
        )
        .with_body(
            "/p/beta/",
            listing_body("beta", &[(2, "2 days ago", "Beta issue")]),
        )
        .with_body("/p/gamma/", not_found_body("gamma"));
    let host = MockHost::new();

    let driver = PanelDriver::from_prefs(
        mock,
        multi_project_prefs("alpha", "beta|gamma"),
        host.clone(),
    );
    let outcome = driver.load().await.unwrap();

    // The barrier closed even though one source failed
    assert_eq!(outcome, CycleOutcome::Rendered);

    // Exactly one transient notice, naming the unresolvable source
    let notices = host.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].0.contains("gamma"));

    // The failed source contributed zero records
    let html = host.last_render().unwrap();
    assert!(html.contains("Alpha issue"));
    assert!(html.contains("Beta issue"));
    assert!(!html.contains("gamma"));
    assert_eq!(driver.records().len(), 2);
}

#[tokio::test]
async fn merged_records_sort_across_sources_by_recency() {
    let mock = MockFetcher::new()
        .with_body(
            "/p/alpha/",
            listing_body("alpha", &[(1, "2 days ago", "Older alpha")]),
        )
        .with_body(
            "/p/beta/",
            listing_body("beta", &[(2, "3 hours ago", "Fresh beta")]),
        );
    let host = MockHost::new();

    let driver = PanelDriver::from_prefs(mock, multi_project_prefs("alpha", "beta"), host.clone());
    driver.load().await.unwrap();

    let html = host.last_render().unwrap();
    let beta = html.find("Fresh beta").unwrap();
    let alpha = html.find("Older alpha").unwrap();
    assert!(beta < alpha, "hours bucket sorts before days bucket");
}

#[tokio::test]
async fn forty_seven_items_cap_at_four_pages_with_see_all() {
    // 24 + 23 records across two sources
    let rows_a: Vec<(u32, String, String)> = (0..24)
        .map(|i| (100 + i, format!("{} days ago", i + 1), format!("A{}", i)))
        .collect();
    let rows_b: Vec<(u32, String, String)> = (0..23)
        .map(|i| (200 + i, format!("{} hours ago", i + 1), format!("B{}", i)))
        .collect();
    let body = |source: &str, rows: &[(u32, String, String)]| {
        let refs: Vec<(u32, &str, &str)> = rows
            .iter()
            .map(|(id, when, summary)| (*id, when.as_str(), summary.as_str()))
            .collect();
        listing_body(source, &refs)
    };

    let mock = MockFetcher::new()
        .with_body("/p/alpha/", body("alpha", &rows_a))
        .with_body("/p/beta/", body("beta", &rows_b));
    let host = MockHost::new();

    let driver = PanelDriver::from_prefs(
        mock.clone(),
        multi_project_prefs("alpha", "beta"),
        host.clone(),
    );
    driver.load().await.unwrap();
    assert_eq!(driver.records().len(), 47);

    let fetches_after_load = mock.call_count();

    // Walk to the last displayed page: 47 items cap at 4 page links
    driver.change_page(PageEvent::Page(4)).await.unwrap();
    let html = host.last_render().unwrap();
    assert!(html.contains("id='more'"), "overflow exposes see-all: {}", html);
    assert!(!html.contains("id='next'"), "no next past the display cap");
    assert!(!html.contains("id='page5'"));

    // Multi-source paging is local: no further fetches were issued, and
    // the see-all affordance is an external link, not an inline fetch
    assert_eq!(mock.call_count(), fetches_after_load);
    assert!(html.contains("target='_blank' id='more'"));
}

#[tokio::test]
async fn stale_generation_responses_are_discarded() {
    let slow = listing_body("alpha", &[(1, "5 days ago", "Stale record")]);
    let fast_alpha = listing_body("alpha", &[(3, "moments ago", "Fresh alpha record")]);
    let fast_beta = listing_body("beta", &[(4, "moments ago", "Fresh beta record")]);

    // Generation G: both sources respond slowly (starred filter).
    // Generation G+1: the user has switched filters; responses are fast.
    let mock = MockFetcher::new()
        .with_body("q=is%3Astarred", slow)
        .with_body("/p/alpha/", fast_alpha)
        .with_body("/p/beta/", fast_beta)
        .with_delay("q=is%3Astarred", Duration::from_millis(80));
    let host = MockHost::new();

    let driver = std::sync::Arc::new(PanelDriver::from_prefs(
        mock,
        multi_project_prefs("alpha", "beta"),
        host.clone(),
    ));

    // Start generation G and let it suspend at the fetch boundary
    let slow_driver = std::sync::Arc::clone(&driver);
    let slow_cycle = tokio::spawn(async move { slow_driver.change_filter(Filter::Starred).await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    // User action starts generation G+1 while G is still in flight
    let outcome = driver.change_filter(Filter::All).await.unwrap();
    assert_eq!(outcome, CycleOutcome::Rendered);

    // Generation G settles late and must be discarded
    let stale_outcome = slow_cycle.await.unwrap().unwrap();
    assert_eq!(stale_outcome, CycleOutcome::Superseded);

    // Nothing from generation G reached the display or the aggregate
    let html = host.last_render().unwrap();
    assert!(html.contains("Fresh alpha record"));
    assert!(html.contains("Fresh beta record"));
    assert!(!html.contains("Stale record"));
    let records = driver.records();
    assert!(records.iter().all(|r| !r.summary.contains("Stale")));
}

#[tokio::test]
async fn zero_results_across_all_sources_renders_no_results() {
    let empty = |source: &str| {
        format!(
            "<html><head><title> Issues - {} - Hosting </title></head>\
             <body>Your search did not generate any results.</body></html>",
            source
        )
    };
    let mock = MockFetcher::new()
        .with_body("/p/alpha/", empty("alpha"))
        .with_body("/p/beta/", empty("beta"));
    let host = MockHost::new();

    let driver = PanelDriver::from_prefs(mock, multi_project_prefs("alpha", "beta"), host.clone());
    let outcome = driver.load().await.unwrap();

    assert_eq!(outcome, CycleOutcome::Rendered);
    assert!(host
        .last_render()
        .unwrap()
        .contains("There are no issues matching this query."));
    assert_eq!(host.notice_count(), 0, "zero results is not an error");
}

#[tokio::test]
async fn transport_failure_settles_the_barrier_with_a_notice() {
    let mock = MockFetcher::new()
        .with_body(
            "/p/alpha/",
            listing_body("alpha", &[(1, "3 hours ago", "Alpha issue")]),
        )
        .with_failure("/p/beta/");
    let host = MockHost::new();

    let driver = PanelDriver::from_prefs(mock, multi_project_prefs("alpha", "beta"), host.clone());
    let outcome = driver.load().await.unwrap();

    assert_eq!(outcome, CycleOutcome::Rendered);
    assert_eq!(host.notice_count(), 1);
    assert!(host.notices()[0].0.contains("beta"));
    assert_eq!(driver.records().len(), 1);
}
