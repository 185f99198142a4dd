//! scheme.v1 coding scheme definition
//!
//! A coding scheme declares, for one instrument, how raw response tokens map
//! to integer item scores: the absolute column range the items occupy in a
//! submission row, the regular token table, and which items are
//! reverse-coded. Schemes are data, not code. New instrument layouts load
//! from a `scheme.v1` JSON document through the same validated constructor as
//! the built-ins.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Current scheme configuration version
pub const SCHEME_VERSION: &str = "scheme.v1";

/// Serialized form of a coding scheme (`scheme.v1`).
///
/// Only the regular table is stored; the reverse table is derived at
/// construction so the two can never drift apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeConfig {
    /// Instrument name, also the score column name (e.g. "k6_score")
    pub name: String,
    /// Absolute column of item 1 in a submission row
    pub first_column: usize,
    /// Absolute column of the last item, inclusive
    pub last_column: usize,
    /// Highest item score on the scale; reverse scores mirror around this
    pub max_ordinal: i64,
    /// Token → score for regularly coded items
    pub regular: BTreeMap<String, i64>,
    /// 1-based item numbers scored with mirrored values
    #[serde(default)]
    pub reverse_items: BTreeSet<usize>,
}

/// Validated, ready-to-score coding scheme for one instrument.
#[derive(Debug, Clone)]
pub struct CodingScheme {
    name: String,
    first_column: usize,
    last_column: usize,
    max_ordinal: i64,
    regular: BTreeMap<String, i64>,
    reverse: BTreeMap<String, i64>,
    reverse_items: BTreeSet<usize>,
}

impl CodingScheme {
    /// Build a scheme, enforcing the construction-time invariants:
    /// a non-empty item range, every regular score within `0..=max_ordinal`,
    /// and every reverse item number inside the item range. The reverse table
    /// is derived here as `max_ordinal - regular[token]`.
    pub fn new(config: SchemeConfig) -> Result<Self, ScoreError> {
        if config.name.is_empty() {
            return Err(ScoreError::InvalidScheme("scheme name is empty".into()));
        }
        if config.last_column < config.first_column {
            return Err(ScoreError::InvalidScheme(format!(
                "{}: item range [{}, {}] is empty",
                config.name, config.first_column, config.last_column
            )));
        }
        if config.regular.is_empty() {
            return Err(ScoreError::InvalidScheme(format!(
                "{}: regular coding table is empty",
                config.name
            )));
        }

        for (token, value) in &config.regular {
            if *value < 0 || *value > config.max_ordinal {
                return Err(ScoreError::InvalidScheme(format!(
                    "{}: token {:?} scores {} outside 0..={}",
                    config.name, token, value, config.max_ordinal
                )));
            }
        }

        let item_count = config.last_column - config.first_column + 1;
        for item in &config.reverse_items {
            if *item < 1 || *item > item_count {
                return Err(ScoreError::InvalidScheme(format!(
                    "{}: reverse item {} outside 1..={}",
                    config.name, item, item_count
                )));
            }
        }

        let reverse = config
            .regular
            .iter()
            .map(|(token, value)| (token.clone(), config.max_ordinal - value))
            .collect();

        Ok(Self {
            name: config.name,
            first_column: config.first_column,
            last_column: config.last_column,
            max_ordinal: config.max_ordinal,
            regular: config.regular,
            reverse,
            reverse_items: config.reverse_items,
        })
    }

    /// Score one item's token. `item` is 1-based within the instrument.
    ///
    /// Reverse items consult the mirrored table. A token missing from the
    /// applicable table is malformed or out-of-schema input and fails with
    /// `UnknownResponseToken`; it is never treated as zero.
    pub fn score(&self, item: usize, token: &str, participant: &str) -> Result<i64, ScoreError> {
        let table = if self.reverse_items.contains(&item) {
            &self.reverse
        } else {
            &self.regular
        };

        table
            .get(token)
            .copied()
            .ok_or_else(|| ScoreError::UnknownResponseToken {
                instrument: self.name.clone(),
                participant: participant.to_string(),
                item,
                token: token.to_string(),
            })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute column of item 1 in a submission row.
    pub fn first_column(&self) -> usize {
        self.first_column
    }

    /// Absolute column of the last item, inclusive.
    pub fn last_column(&self) -> usize {
        self.last_column
    }

    /// Number of items the instrument scores.
    pub fn item_count(&self) -> usize {
        self.last_column - self.first_column + 1
    }

    pub fn max_ordinal(&self) -> i64 {
        self.max_ordinal
    }
}

impl TryFrom<SchemeConfig> for CodingScheme {
    type Error = ScoreError;

    fn try_from(config: SchemeConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_config() -> SchemeConfig {
        SchemeConfig {
            name: "sample".to_string(),
            first_column: 5,
            last_column: 8,
            max_ordinal: 3,
            regular: [("1", 0), ("2", 1), ("3", 2), ("4", 3)]
                .into_iter()
                .map(|(t, v)| (t.to_string(), v))
                .collect(),
            reverse_items: BTreeSet::from([2]),
        }
    }

    #[test]
    fn test_regular_and_reverse_tables_mirror() {
        let scheme = CodingScheme::new(sample_config()).unwrap();

        // For every token, regular + reverse == max_ordinal.
        for (token, value) in &scheme.regular {
            let reversed = scheme.reverse[token];
            assert_eq!(value + reversed, scheme.max_ordinal());
        }
    }

    #[test]
    fn test_reverse_item_scores_mirrored() {
        let scheme = CodingScheme::new(sample_config()).unwrap();

        assert_eq!(scheme.score(1, "4", "7").unwrap(), 3);
        // Item 2 is reverse-coded: 3 - 3 = 0.
        assert_eq!(scheme.score(2, "4", "7").unwrap(), 0);
        assert_eq!(scheme.score(2, "1", "7").unwrap(), 3);
    }

    #[test]
    fn test_unknown_token_is_an_error() {
        let scheme = CodingScheme::new(sample_config()).unwrap();

        let err = scheme.score(1, "", "7").unwrap_err();
        match err {
            ScoreError::UnknownResponseToken {
                instrument,
                participant,
                item,
                token,
            } => {
                assert_eq!(instrument, "sample");
                assert_eq!(participant, "7");
                assert_eq!(item, 1);
                assert_eq!(token, "");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_score_outside_ordinal_range() {
        let mut config = sample_config();
        config.regular.insert("5".to_string(), 4);

        assert!(matches!(
            CodingScheme::new(config),
            Err(ScoreError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_rejects_reverse_item_outside_range() {
        let mut config = sample_config();
        config.reverse_items.insert(5); // only 4 items

        assert!(matches!(
            CodingScheme::new(config),
            Err(ScoreError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_rejects_empty_range_and_table() {
        let mut config = sample_config();
        config.last_column = 4;
        assert!(CodingScheme::new(config).is_err());

        let mut config = sample_config();
        config.regular.clear();
        assert!(CodingScheme::new(config).is_err());
    }

    #[test]
    fn test_config_json_round_trip() {
        let json = serde_json::to_string(&sample_config()).unwrap();
        let parsed: SchemeConfig = serde_json::from_str(&json).unwrap();
        let scheme = CodingScheme::new(parsed).unwrap();

        assert_eq!(scheme.name(), "sample");
        assert_eq!(scheme.item_count(), 4);
    }

    #[test]
    fn test_reverse_items_default_to_empty() {
        let json = r#"{
            "name": "plain",
            "first_column": 2,
            "last_column": 3,
            "max_ordinal": 1,
            "regular": {"no": 0, "yes": 1}
        }"#;
        let config: SchemeConfig = serde_json::from_str(json).unwrap();
        let scheme = CodingScheme::new(config).unwrap();

        assert_eq!(scheme.score(1, "yes", "1").unwrap(), 1);
        assert_eq!(scheme.score(2, "yes", "1").unwrap(), 1);
    }
}
