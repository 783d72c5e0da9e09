//! HTML rendering of the merged record view.
//!
//! Rendering is a pure string-building step; the host's `render`
//! collaborator owns the actual display region. Truncation here is
//! display-only and never mutates the stored records.

use std::sync::LazyLock;

use regex::Regex;

use crate::paginate::PageLink;
use crate::types::record::Record;
use crate::types::query::detail_url;

/// Per-word display truncation limit for summaries.
pub const SUMMARY_WORD_LIMIT: usize = 20;

/// Transient notice shown when a source project does not resolve.
pub fn unresolved_source_notice(source: &str) -> String {
    format!(
        "The project name, {}, in the user preferences is invalid.",
        source
    )
}

/// Transient notice shown when a source fails to load.
pub fn fetch_failed_notice(source: &str) -> String {
    format!("The project {} could not be loaded.", source)
}

/// Transient notice shown when a user-scoped filter has no user name.
pub const USER_NAME_REQUIRED_NOTICE: &str =
    "To use this feature, please enter your user name in the preferences of this gadget.";

static AGO_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*ago").expect("ago pattern"));

/// Message body when the merged result set is empty.
pub fn no_results_html() -> &'static str {
    "There are no issues matching this query."
}

/// Prompt shown when no valid project is configured.
pub fn project_prompt_html() -> String {
    concat!(
        "<center><form action='#'><table cellpadding='0' cellspacing='0'>",
        "<tr><td align='left' style='font-size: 12px'>The specified project does not exist.",
        "<br />Please enter a valid project name:</td></tr>",
        "<tr><td align='center'><input size='30' id='projectName' name='projectName' /></td></tr>",
        "<tr><td align='right'><input type='submit' id='name_submit' value='Load Project'/></td></tr>",
        "</table></form></center>"
    )
    .to_string()
}

/// Truncate to at most `max` characters, appending an ellipsis.
pub fn ellipsify(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max).collect();
    format!("{}...", truncated)
}

/// Truncate each whitespace-separated word to `max` characters.
///
/// Keeps long summaries from blowing out the panel width without cutting
/// the summary itself short.
pub fn ellipsify_words(text: &str, max: usize) -> String {
    text.split(' ')
        .map(|word| ellipsify(word, max))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape text for interpolation into the panel's HTML.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the visible window of records as the panel's table.
///
/// Multi-source rows carry the source name on their own header line;
/// single-source rows are one line each. An empty window renders the
/// no-results message instead.
pub fn record_table(records: &[Record], multi_source: bool) -> String {
    if records.is_empty() {
        return no_results_html().to_string();
    }

    let mut html = String::from(
        "<center><table cellspacing='0' cellpadding='0' width='100%' id='resultstable' \
         style='border-bottom: 1px solid #BBBBBB;'>",
    );
    for record in records {
        let when = escape_html(AGO_SUFFIX.replace(&record.sort_key, "").trim());
        let summary = escape_html(&ellipsify_words(
            record.summary.trim_end(),
            SUMMARY_WORD_LIMIT,
        ));
        let link = format!(
            "<a href='{}' target='_blank'>{}</a>",
            detail_url(&record.source_id, &record.id),
            escape_html(&record.id)
        );

        if multi_source {
            html.push_str(&format!(
                "<tr><td valign='top' style='white-space: nowrap; border-top: 1px solid #BBBBBB;'>{}</td>\
                 <td valign='top' style='white-space: nowrap; border-top: 1px solid #BBBBBB;'>{}</td></tr>\
                 <tr><td valign='top'>{}</td><td valign='top'>{}</td></tr>",
                when,
                escape_html(&record.source_id),
                link,
                summary
            ));
        } else {
            html.push_str(&format!(
                "<tr><td valign='top' style='border-top: 1px solid #BBBBBB;'>{}</td>\
                 <td valign='top' style='white-space: nowrap; border-top: 1px solid #BBBBBB;'>{}</td>\
                 <td valign='top' style='border-top: 1px solid #BBBBBB;'>{}</td></tr>",
                link, when, summary
            ));
        }
    }
    html.push_str("</table></center>");
    html
}

/// Render the navigation control.
///
/// The current page is plain text; every other element is an anchor the
/// host wires to page events. The see-all anchor points at the external
/// full listing and opens outside the panel.
pub fn paging_html(links: &[PageLink], see_all_url: &str) -> String {
    let mut html = String::new();
    for link in links {
        match link {
            PageLink::Prev => html.push_str("<a href='#' id='prev'>Previous</a>&nbsp;"),
            PageLink::Page { number, current } => {
                if *current {
                    html.push_str(&format!("{}&nbsp;", number));
                } else {
                    html.push_str(&format!(
                        "<a href='#' id='page{n}'>{n}</a>&nbsp;",
                        n = number
                    ));
                }
            }
            PageLink::Next => html.push_str("<a href='#' id='next'>Next</a>&nbsp;"),
            PageLink::SeeAll => html.push_str(&format!(
                "<br /><a href='{}' target='_blank' id='more'>See all items</a>",
                see_all_url
            )),
        }
    }
    html
}
