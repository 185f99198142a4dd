//! Accumulating score table
//!
//! One row per canonical participant, one column per instrument pass. Columns
//! merge by participant id, never by row position: score tables produced from
//! different instrument passes are not guaranteed to cover the same
//! participants, so positional alignment would silently shift columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-participant instrument scores, ordered by ascending numeric id.
///
/// A participant with no score for some column holds `None` there, emitted as
/// an empty field in CSV output. Merging a column name that already exists
/// overwrites that column in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    columns: Vec<String>,
    rows: BTreeMap<u64, Vec<Option<i64>>>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one instrument's scores as a named column, joined on
    /// participant id.
    ///
    /// Participants already in the table but absent from `scores` get `None`;
    /// participants new to the table are added with `None` backfill for the
    /// earlier columns, so no pass can shrink the table.
    pub fn merge_column(&mut self, scores: &BTreeMap<u64, i64>, column_name: &str) {
        let slot = match self.columns.iter().position(|c| c == column_name) {
            Some(existing) => existing,
            None => {
                self.columns.push(column_name.to_string());
                for row in self.rows.values_mut() {
                    row.push(None);
                }
                self.columns.len() - 1
            }
        };

        for row in self.rows.values_mut() {
            row[slot] = None;
        }
        let width = self.columns.len();
        for (&id, &score) in scores {
            let row = self.rows.entry(id).or_insert_with(|| vec![None; width]);
            row[slot] = Some(score);
        }
    }

    /// Column names in merge order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Score for one (participant, column) pair.
    pub fn score(&self, id: u64, column_name: &str) -> Option<i64> {
        let slot = self.columns.iter().position(|c| c == column_name)?;
        self.rows.get(&id).and_then(|row| row[slot])
    }

    /// Rows in ascending numeric id order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[Option<i64>])> {
        self.rows.iter().map(|(id, row)| (*id, row.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flatten to output records: a `id,<columns...>` header followed by one
    /// record per participant, missing scores as empty fields.
    pub fn to_records(&self) -> Vec<Vec<String>> {
        let mut records = Vec::with_capacity(self.rows.len() + 1);

        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push("id".to_string());
        header.extend(self.columns.iter().cloned());
        records.push(header);

        for (id, row) in &self.rows {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(id.to_string());
            record.extend(
                row.iter()
                    .map(|score| score.map(|s| s.to_string()).unwrap_or_default()),
            );
            records.push(record);
        }

        records
    }

    /// Serialize the accumulated table to JSON, for persistence between
    /// instrument passes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a table saved with [`to_json`](Self::to_json).
    ///
    /// Every row must hold exactly one score slot per column. A hand-edited
    /// or corrupt document that breaks this is rejected here, before any
    /// merge or lookup can index past a short row.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        use serde::de::Error;

        let table: Self = serde_json::from_str(json)?;
        let width = table.columns.len();
        for (id, row) in &table.rows {
            if row.len() != width {
                return Err(serde_json::Error::custom(format!(
                    "participant {id}: row has {} score slots but the table has {width} columns",
                    row.len()
                )));
            }
        }
        Ok(table)
    }
}
