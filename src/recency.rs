//! Heuristic ordering of opaque relative-time strings.
//!
//! The tracker's listings expose only human-relative time text ("3 days
//! ago", "Jan 14"), never absolute timestamps, so date ordering has to be
//! heuristic: classify each string into an ordinal recency bucket, then
//! break same-bucket ties with the embedded number. This is deliberately
//! coarse - no calendar math, and a tie inside the "moments" bucket is
//! always a tie.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]{3} [0-9]{1,2}$").expect("month-day pattern"));
static MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]{3} [0-9]{4}$").expect("month-year pattern"));
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("number pattern"));

/// Ordinal recency band of a relative-time string.
///
/// Declaration order is rank order: smaller rank means more recent.
/// Strings that match no band land in [`RecencyBucket::Unrecognized`],
/// the stalest bucket, so the comparator is total and never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecencyBucket {
    /// "moments ago" - always ranked newest, ties never broken
    Moments,
    /// "N minutes ago"
    Minutes,
    /// "N hours ago"
    Hours,
    /// "N days ago"
    Days,
    /// "Jan 14" - month and day, implies the current year
    MonthDay,
    /// "Jan 2009" - month with an explicit year
    MonthYear,
    /// Anything else
    Unrecognized,
}

impl RecencyBucket {
    /// Ordinal rank, increasing with staleness.
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Count-up bands ("N units ago") where a larger embedded number
    /// means older; absolute bands invert that.
    pub fn counts_up(self) -> bool {
        self.rank() <= RecencyBucket::Days.rank()
    }
}

/// Classify one relative-time string into its recency bucket.
///
/// Matching is case-insensitive and keys on the unit words, matching the
/// tracker's own phrasing.
pub fn classify(text: &str) -> RecencyBucket {
    let text = text.trim().to_lowercase();
    if text.contains("moments") {
        RecencyBucket::Moments
    } else if text.contains("minutes") {
        RecencyBucket::Minutes
    } else if text.contains("hours") {
        RecencyBucket::Hours
    } else if text.contains("days") {
        RecencyBucket::Days
    } else if MONTH_DAY.is_match(&text) {
        RecencyBucket::MonthDay
    } else if MONTH_YEAR.is_match(&text) {
        RecencyBucket::MonthYear
    } else {
        RecencyBucket::Unrecognized
    }
}

/// Order two relative-time strings, more recent first.
///
/// Different buckets order strictly by rank. Within a bucket (other than
/// "moments", which never distinguishes), the first embedded integer
/// breaks the tie: for count-up bands a larger number is older, for
/// absolute bands a larger number is more recent. Missing numbers count
/// as zero; equal numbers are a tie. Never panics.
pub fn compare_recency(a: &str, b: &str) -> Ordering {
    let bucket_a = classify(a);
    let bucket_b = classify(b);

    if bucket_a != bucket_b {
        return bucket_a.rank().cmp(&bucket_b.rank());
    }
    if bucket_a == RecencyBucket::Moments {
        return Ordering::Equal;
    }

    let num_a = embedded_number(a);
    let num_b = embedded_number(b);
    if num_a == num_b {
        return Ordering::Equal;
    }

    let a_is_larger = num_a > num_b;
    if bucket_a.counts_up() {
        // "5 days ago" is older than "2 days ago"
        if a_is_larger {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    } else {
        // "Jan 2010" is more recent than "Jan 2009"
        if a_is_larger {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

/// The non-date ordering: case-insensitive lexicographic over sort keys.
pub fn compare_field(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// First embedded integer in the string, zero when absent or oversized.
fn embedded_number(text: &str) -> u64 {
    NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
