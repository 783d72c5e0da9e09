//! Record extraction from fetched tracker documents.
//!
//! The tracker serves semi-structured HTML (an issue listing table) or an
//! update feed (Atom-ish entries). Extraction is rule-driven: a fixed set
//! of compiled patterns locates the listing region, the rows, and the
//! pagination block, so markup drift means updating a pattern rather than
//! control flow.
//!
//! Tolerance contract: a row missing its identifier or summary is dropped
//! silently; extraction of the remaining rows continues. A document with
//! zero matching rows is an ordinary empty listing, not an error. Only the
//! tracker's not-found signature is an error, because it means the source
//! itself does not resolve.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ScrapeError, ScrapeResult};
use crate::types::record::Record;

/// Compiled extraction rules for the tracker's listing markup.
struct ListingRules {
    not_found: Regex,
    zero_results: Regex,
    results_table: Regex,
    row: Regex,
    cell: Regex,
    source_title: Regex,
    pagination: Regex,
    total: Regex,
    next_link: Regex,
    prev_link: Regex,
    tag: Regex,
}

static RULES: LazyLock<ListingRules> = LazyLock::new(|| ListingRules {
    not_found: Regex::new(r"The requested URL <code>.*</code> was not found on this server\.")
        .expect("not-found pattern"),
    zero_results: Regex::new(r"Your search did not generate any results\.")
        .expect("zero-results pattern"),
    results_table: Regex::new(r#"(?s)<table[^>]*id=["']?resultstable["']?[^>]*>(.*?)</table>"#)
        .expect("results-table pattern"),
    row: Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").expect("row pattern"),
    cell: Regex::new(r"(?s)<td[^>]*>(.*?)</td>").expect("cell pattern"),
    source_title: Regex::new(r"<title>\s*\S+\s*-\s*(\S+)").expect("title pattern"),
    pagination: Regex::new(r#"(?s)<div[^>]*class=["']?pagination["']?[^>]*>(.*?)</div>"#)
        .expect("pagination pattern"),
    total: Regex::new(r"of\s+([0-9][0-9,]*)").expect("total pattern"),
    next_link: Regex::new(r#"(?s)<a href=".+?">\s*Next"#).expect("next-link pattern"),
    prev_link: Regex::new(r#"(?s)<a href=".+?">[^<]*Prev"#).expect("prev-link pattern"),
    tag: Regex::new(r"<[^>]+>").expect("tag pattern"),
});

static FEED_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry[^>]*>(.*?)</entry>").expect("feed-entry pattern"));
static FEED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<id[^>]*>(.*?)</id>").expect("feed-id pattern"));
static FEED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("feed-title pattern"));
static FEED_UPDATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<updated[^>]*>(.*?)</updated>").expect("feed-updated pattern"));

/// Pagination metadata scraped from a listing, when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingMeta {
    /// Total item count from the "x - y of N" text.
    pub total_count: Option<u64>,

    /// Whether the listing shows a previous-page affordance.
    pub has_prev: bool,

    /// Whether the listing shows a next-page affordance (more results).
    pub has_next: bool,
}

impl ListingMeta {
    /// Whether the source's own view is paginated at all.
    pub fn is_paginated(&self) -> bool {
        self.has_prev || self.has_next
    }
}

/// Everything extracted from one fetched listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Records in document order. Empty for a zero-result listing.
    pub records: Vec<Record>,

    /// Pagination metadata, if the document carried a pagination block.
    pub meta: ListingMeta,

    /// Source display name scraped from the title element.
    pub source_name: Option<String>,
}

impl Listing {
    /// Check if the listing carried no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Extract a listing from a fetched document.
///
/// `fallback_source` labels records when the document's title yields no
/// display name. Returns [`ScrapeError::SourceNotFound`] only for the
/// tracker's not-found signature; a listing with zero results is `Ok`
/// with no records.
pub fn parse_listing(html: &str, fallback_source: &str) -> ScrapeResult<Listing> {
    if RULES.not_found.is_match(html) {
        let scraped = scrape_unresolved_source(html);
        let source = if scraped.is_empty() {
            fallback_source.to_string()
        } else {
            scraped
        };
        tracing::warn!(source = %source, "document matches not-found signature");
        return Err(ScrapeError::SourceNotFound { source });
    }

    let source_name = RULES
        .source_title
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string());
    let meta = parse_meta(html);

    if RULES.zero_results.is_match(html) {
        tracing::debug!(source = %fallback_source, "listing has zero results");
        return Ok(Listing {
            records: Vec::new(),
            meta,
            source_name,
        });
    }

    let source_id = source_name
        .clone()
        .unwrap_or_else(|| fallback_source.to_string());

    let mut records = Vec::new();
    if let Some(table) = RULES.results_table.captures(html).and_then(|c| c.get(1)) {
        for row in RULES.row.captures_iter(table.as_str()) {
            let cells: Vec<String> = RULES
                .cell
                .captures_iter(row.get(1).map(|m| m.as_str()).unwrap_or(""))
                .map(|c| cell_text(c.get(1).map(|m| m.as_str()).unwrap_or("")))
                .collect();
            if let Some(record) = record_from_cells(&cells, &source_id) {
                records.push(record);
            }
        }
    }

    tracing::debug!(
        source = %source_id,
        records = records.len(),
        total = ?meta.total_count,
        "listing extracted"
    );

    Ok(Listing {
        records,
        meta,
        source_name,
    })
}

/// Extract records from an update feed document.
///
/// Entries missing an identifier or title are dropped; the entry's
/// updated text becomes the record's sort key as-is.
pub fn parse_feed(xml: &str, source: &str) -> ScrapeResult<Vec<Record>> {
    if RULES.not_found.is_match(xml) {
        return Err(ScrapeError::SourceNotFound {
            source: source.to_string(),
        });
    }

    let mut records = Vec::new();
    for entry in FEED_ENTRY.captures_iter(xml) {
        let body = entry.get(1).map(|m| m.as_str()).unwrap_or("");
        let id = FEED_ID
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| feed_entry_id(m.as_str()))
            .unwrap_or_default();
        let title = FEED_TITLE
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| cell_text(m.as_str()))
            .unwrap_or_default();
        let updated = FEED_UPDATED
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        if id.is_empty() || title.is_empty() {
            continue;
        }
        records.push(Record::new(updated, id, title, source));
    }
    Ok(records)
}

/// Scrape the unresolvable project name out of a not-found body.
///
/// The tracker echoes the requested path; the slug sits between `/p/`
/// and `/issues/`. Empty when the path shape is absent.
pub fn scrape_unresolved_source(body: &str) -> String {
    let Some(start) = body.find("/p/") else {
        return String::new();
    };
    let after = start + 3;
    let Some(end) = body[after..].find("/issues/") else {
        return String::new();
    };
    body[after..after + end].to_string()
}

fn parse_meta(html: &str) -> ListingMeta {
    let Some(block) = RULES.pagination.captures(html).and_then(|c| c.get(1)) else {
        return ListingMeta::default();
    };
    let block = block.as_str();
    let total_count = RULES
        .total
        .captures(block)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse().ok());
    ListingMeta {
        total_count,
        has_prev: RULES.prev_link.is_match(block),
        has_next: RULES.next_link.is_match(block),
    }
}

/// Build a record from one row's cell texts, or drop the row.
///
/// The listing table wraps each row in a leading star cell and a trailing
/// filler cell; between them sit id, the sort column, zero or more label
/// columns, and the summary last. Rows without enough cells, or with an
/// empty id or summary, are dropped.
fn record_from_cells(cells: &[String], source_id: &str) -> Option<Record> {
    if cells.len() < 6 {
        return None;
    }
    let inner = &cells[1..cells.len() - 1];
    let id = inner.first()?;
    let sort_key = inner.get(1)?;
    let summary = inner.last()?;
    if id.is_empty() || summary.is_empty() {
        return None;
    }
    Some(Record::new(sort_key, id, summary, source_id))
}

/// Strip tags, decode common entities, and collapse whitespace.
fn cell_text(html: &str) -> String {
    let text = RULES.tag.replace_all(html, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn feed_entry_id(raw: &str) -> String {
    let raw = raw.trim();
    raw.rsplit('/').next().unwrap_or(raw).to_string()
}
