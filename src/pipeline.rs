//! Pipeline orchestration
//!
//! This module provides the public API for psyscore. It runs the full
//! pipeline from raw submission rows to a merged score table: deduplication
//! once, then one scoring pass per instrument.

use std::collections::BTreeMap;

use crate::coding::CodingScheme;
use crate::dedup::Deduplicator;
use crate::error::ScoreError;
use crate::scorer::InstrumentScorer;
use crate::table::ScoreTable;
use crate::types::{CanonicalResponseSet, RawResponseRow};

/// Score raw submissions against a set of instruments.
///
/// Deduplicates once, then scores every canonical participant on each scheme
/// in turn and merges the passes into one table. Whole-batch semantics: any
/// error aborts with no table produced.
///
/// # Example
/// ```ignore
/// let table = score_responses(&rows, &[k6_scheme, srs2_scheme])?;
/// for record in table.to_records() { /* write CSV */ }
/// ```
pub fn score_responses(
    rows: &[RawResponseRow],
    schemes: &[CodingScheme],
) -> Result<ScoreTable, ScoreError> {
    let canonical = Deduplicator::deduplicate(rows)?;

    let mut processor = ScoreProcessor::new();
    for scheme in schemes {
        processor.run_pass(&canonical, scheme)?;
    }

    Ok(processor.into_table())
}

/// Score one instrument over an already-deduplicated set.
pub fn score_instrument_pass(
    canonical: &CanonicalResponseSet,
    scheme: &CodingScheme,
) -> Result<BTreeMap<u64, i64>, ScoreError> {
    let mut scores = BTreeMap::new();
    for (id, row) in canonical.iter() {
        scores.insert(id, InstrumentScorer::score(row, scheme)?);
    }
    Ok(scores)
}

/// Stateful processor for incremental scoring with a persistent table.
///
/// Use this when instrument passes happen at different times: the table
/// accumulated so far can be saved to JSON after each pass and reloaded
/// before the next, and each pass merges one column by participant id.
#[derive(Default)]
pub struct ScoreProcessor {
    table: ScoreTable,
}

impl ScoreProcessor {
    /// Create a processor with an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a previously saved score table
    pub fn load_table(&mut self, json: &str) -> Result<(), ScoreError> {
        self.table = ScoreTable::from_json(json)?;
        Ok(())
    }

    /// Save the accumulated score table to JSON
    pub fn save_table(&self) -> Result<String, ScoreError> {
        Ok(self.table.to_json()?)
    }

    /// Score one instrument over a canonical set and merge the result as a
    /// column. Fail-fast: on error the table is left unchanged.
    pub fn run_pass(
        &mut self,
        canonical: &CanonicalResponseSet,
        scheme: &CodingScheme,
    ) -> Result<(), ScoreError> {
        let scores = score_instrument_pass(canonical, scheme)?;
        self.table.merge_column(&scores, scheme.name());
        Ok(())
    }

    /// Deduplicate raw rows, then run one pass.
    pub fn run_raw_pass(
        &mut self,
        rows: &[RawResponseRow],
        scheme: &CodingScheme,
    ) -> Result<(), ScoreError> {
        let canonical = Deduplicator::deduplicate(rows)?;
        self.run_pass(&canonical, scheme)
    }

    /// The table accumulated so far
    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    /// Consume the processor, yielding the accumulated table
    pub fn into_table(self) -> ScoreTable {
        self.table
    }
}
