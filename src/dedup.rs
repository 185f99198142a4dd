//! Response deduplication
//!
//! Participants may submit the questionnaire more than once; only the most
//! recent submission counts. This module reduces a multi-submission input to
//! one canonical row per participant, ordered by ascending numeric id.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::error::ScoreError;
use crate::types::{parse_participant_id, CanonicalResponseSet, RawResponseRow};

/// Literal timestamp format of the survey export (column 0)
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Deduplicator for reducing raw submissions to one row per participant
pub struct Deduplicator;

impl Deduplicator {
    /// Keep the latest submission per participant.
    ///
    /// Rows sharing an identical timestamp resolve last-in-input-order; the
    /// single forward scan with `>=` replacement makes that the policy rather
    /// than an accident of map iteration. Any unparseable timestamp or
    /// participant id aborts the whole run. Duplicate resolution cannot be
    /// safely attempted on a row whose recency is unknown.
    pub fn deduplicate(rows: &[RawResponseRow]) -> Result<CanonicalResponseSet, ScoreError> {
        let mut latest: BTreeMap<u64, (NaiveDateTime, RawResponseRow)> = BTreeMap::new();

        for (index, row) in rows.iter().enumerate() {
            // Errors report 1-based data rows.
            let id = parse_participant_id(row.participant_id(), index + 1)?;
            let timestamp = parse_timestamp(row.timestamp(), index + 1)?;

            match latest.get(&id) {
                Some((best, _)) if timestamp < *best => {}
                _ => {
                    latest.insert(id, (timestamp, row.clone()));
                }
            }
        }

        let ordered = latest
            .into_iter()
            .map(|(id, (_, row))| (id, row))
            .collect();

        Ok(CanonicalResponseSet::from_ordered(ordered))
    }
}

fn parse_timestamp(value: &str, row: usize) -> Result<NaiveDateTime, ScoreError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        ScoreError::MalformedTimestamp {
            row,
            value: value.to_string(),
        }
    })
}
