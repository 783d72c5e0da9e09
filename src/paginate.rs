//! Page geometry and navigation control descriptors.
//!
//! The display deliberately caps page links at four regardless of the
//! true page count; that is a product constraint of the panel, not a bug.
//! Results past the cap are reachable only through the "see all"
//! affordance, which opens the source's own full listing instead of
//! fetching more data inline.

use serde::{Deserialize, Serialize};

use crate::scrape::ListingMeta;

/// Maximum number of page links shown.
pub const PAGE_LINK_CAP: u64 = 4;

/// Computed page geometry for one listing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Displayed page count, capped at [`PAGE_LINK_CAP`]. Zero only for
    /// an empty result set.
    pub page_count: u64,

    /// True when the current page is the last displayed page and more
    /// results exist beyond what the capped pages can show.
    pub has_overflow: bool,
}

/// One element of the navigation control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLink {
    /// Previous-page affordance, present iff the current page is > 1.
    Prev,
    /// Numbered page; the current page renders as plain text.
    Page { number: u64, current: bool },
    /// Next-page affordance, present iff pages remain after the current.
    Next,
    /// "See all" affordance opening the external full listing.
    SeeAll,
}

/// Compute page geometry from a total count and the current 1-based page.
///
/// `page_size` must be positive. `page_count` is
/// `min(ceil(total / size), 4)`; overflow is flagged only on the last
/// displayed page when the true page count exceeds the cap.
pub fn compute_pages(total_count: u64, page_size: u64, current_page: u64) -> PageGeometry {
    let true_pages = total_count.div_ceil(page_size);
    let page_count = true_pages.min(PAGE_LINK_CAP);
    PageGeometry {
        page_count,
        has_overflow: current_page == page_count && page_count < true_pages,
    }
}

/// Build the navigation control for one page view.
///
/// A single page (or none) needs no navigation and yields an empty
/// control. Page links are built by an explicit walk over
/// `1..=page_count`; the overflow affordance replaces "next" on the last
/// displayed page.
pub fn page_controls(geometry: PageGeometry, current_page: u64) -> Vec<PageLink> {
    let mut links = Vec::new();
    if geometry.page_count <= 1 {
        return links;
    }
    if current_page > 1 {
        links.push(PageLink::Prev);
    }
    for number in 1..=geometry.page_count {
        links.push(PageLink::Page {
            number,
            current: number == current_page,
        });
    }
    if current_page < geometry.page_count {
        links.push(PageLink::Next);
    } else if geometry.has_overflow {
        links.push(PageLink::SeeAll);
    }
    links
}

/// Derive geometry from a scraped listing's own pagination metadata
/// (single-source mode, where the source paginates server-side).
///
/// Returns the geometry and current page, or `None` when the listing is
/// not paginated or carries no usable total.
pub fn geometry_from_listing(
    meta: &ListingMeta,
    start_offset: u64,
    page_size: u64,
) -> Option<(PageGeometry, u64)> {
    if !meta.is_paginated() {
        return None;
    }
    let total = meta.total_count?;
    let current_page = start_offset / page_size + 1;
    let geometry = compute_pages(total, page_size, current_page);
    if geometry.page_count == 0 {
        return None;
    }
    Some((geometry, current_page))
}
