//! The record type - one issue/change entry extracted from a source.

use serde::{Deserialize, Serialize};

/// One issue or change entry extracted from a source listing.
///
/// A record is immutable once extracted: merging across sources only
/// concatenates records into the aggregate sequence, never edits fields.
/// Display truncation happens at render time and never mutates the
/// stored summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque, human-relative time expression (e.g. "3 days ago", "Jan 14").
    ///
    /// Never parsed into an absolute timestamp; ordering is heuristic
    /// (see [`crate::recency`]).
    pub sort_key: String,

    /// Source-assigned identifier, unique within its source project only.
    pub id: String,

    /// Free-text summary. May be truncated for display.
    pub summary: String,

    /// Identifies which project/source produced the record.
    pub source_id: String,
}

impl Record {
    /// Create a new record.
    pub fn new(
        sort_key: impl Into<String>,
        id: impl Into<String>,
        summary: impl Into<String>,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            sort_key: sort_key.into(),
            id: id.into(),
            summary: summary.into(),
            source_id: source_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_construction() {
        let record = Record::new("3 days ago", "101", "Fix crash on load", "alpha");
        assert_eq!(record.sort_key, "3 days ago");
        assert_eq!(record.id, "101");
        assert_eq!(record.summary, "Fix crash on load");
        assert_eq!(record.source_id, "alpha");
    }
}
