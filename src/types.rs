//! Core types for the psyscore pipeline
//!
//! This module defines the data that flows through each stage of the
//! pipeline: raw submission rows and the canonical per-participant set
//! produced by deduplication.

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// One raw questionnaire submission, exactly as exported by the survey tool.
///
/// Column 0 is the submission timestamp (`MM/DD/YYYY HH:MM:SS`), column 1 the
/// participant id; the remaining columns hold item responses and unrelated
/// export metadata at fixed positions. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResponseRow {
    fields: Vec<String>,
}

impl RawResponseRow {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Submission timestamp token (column 0), unparsed.
    pub fn timestamp(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }

    /// Participant id token (column 1), unparsed.
    pub fn participant_id(&self) -> &str {
        self.fields.get(1).map(String::as_str).unwrap_or("")
    }

    /// Raw token at an absolute column offset, if the row extends that far.
    pub fn token(&self, column: usize) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Total number of columns in the row.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// All columns, for writing the row back out unchanged.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl From<Vec<String>> for RawResponseRow {
    fn from(fields: Vec<String>) -> Self {
        Self::new(fields)
    }
}

/// Parse a participant id into its numeric form.
///
/// Ids in the study export are small non-negative integers; anything else is
/// a data error, reported with the 1-based data row that carried it.
pub(crate) fn parse_participant_id(value: &str, row: usize) -> Result<u64, ScoreError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ScoreError::InvalidParticipantId {
            row,
            value: value.to_string(),
        })
}

/// Result of deduplication: one canonical row per participant, ordered by
/// ascending numeric participant id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalResponseSet {
    rows: Vec<(u64, RawResponseRow)>,
}

impl CanonicalResponseSet {
    /// Build from (id, row) pairs. Callers must supply ascending-ordered,
    /// unique ids; `Deduplicator` is the normal producer.
    pub(crate) fn from_ordered(rows: Vec<(u64, RawResponseRow)>) -> Self {
        Self { rows }
    }

    /// Canonical rows with their numeric ids, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &RawResponseRow)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    /// The canonical row for one participant, if present.
    pub fn get(&self, id: u64) -> Option<&RawResponseRow> {
        self.rows
            .binary_search_by_key(&id, |(rid, _)| *rid)
            .ok()
            .map(|idx| &self.rows[idx].1)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(fields: &[&str]) -> RawResponseRow {
        RawResponseRow::new(fields.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_row_accessors() {
        let r = row(&["01/01/2020 10:00:00", "7", "x", "y"]);
        assert_eq!(r.timestamp(), "01/01/2020 10:00:00");
        assert_eq!(r.participant_id(), "7");
        assert_eq!(r.token(3), Some("y"));
        assert_eq!(r.token(4), None);
        assert_eq!(r.width(), 4);
    }

    #[test]
    fn test_parse_participant_id() {
        assert_eq!(parse_participant_id("12", 1).unwrap(), 12);
        assert_eq!(parse_participant_id(" 3 ", 1).unwrap(), 3);

        let err = parse_participant_id("p12", 5).unwrap_err();
        match err {
            ScoreError::InvalidParticipantId { row, value } => {
                assert_eq!(row, 5);
                assert_eq!(value, "p12");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_canonical_set_lookup() {
        let set = CanonicalResponseSet::from_ordered(vec![
            (3, row(&["t", "3"])),
            (7, row(&["t", "7"])),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(7).unwrap().participant_id(), "7");
        assert!(set.get(5).is_none());
    }
}
