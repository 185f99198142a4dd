//! Instrument scoring
//!
//! Applies a coding scheme to one canonical response row: extracts the
//! scheme's column slice, trims each token, codes it, and sums. Scoring is
//! fail-fast. A single unscorable item voids the whole total for that
//! participant, so a malformed submission can never contribute a partial
//! score.

use crate::coding::CodingScheme;
use crate::error::ScoreError;
use crate::types::RawResponseRow;

/// Scorer applying one coding scheme to one response row
pub struct InstrumentScorer;

impl InstrumentScorer {
    /// Total score for one participant on one instrument.
    ///
    /// The row must extend through the scheme's last column; items are
    /// numbered 1-based from the scheme's first column.
    pub fn score(row: &RawResponseRow, scheme: &CodingScheme) -> Result<i64, ScoreError> {
        let participant = row.participant_id();

        if row.width() <= scheme.last_column() {
            return Err(ScoreError::TruncatedRow {
                instrument: scheme.name().to_string(),
                participant: participant.to_string(),
                expected: scheme.last_column() + 1,
                actual: row.width(),
            });
        }

        let mut total = 0;
        for item in 1..=scheme.item_count() {
            let column = scheme.first_column() + item - 1;
            // width was checked above
            let token = row.token(column).unwrap_or("");
            total += scheme.score(item, token.trim(), participant)?;
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding::{CodingScheme, SchemeConfig};
    use crate::instruments;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, BTreeSet};

    fn k6_row(tokens: &[&str]) -> RawResponseRow {
        let mut fields = vec![
            "01/01/2020 10:00:00".to_string(),
            "7".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ];
        fields.extend(tokens.iter().map(|t| t.to_string()));
        RawResponseRow::new(fields)
    }

    #[test]
    fn test_k6_total() {
        let scheme = CodingScheme::new(instruments::k6_config()).unwrap();
        let row = k6_row(&[
            "少しだけ",
            "いつも",
            "全くない",
            "ときどき",
            "たいてい",
            "少しだけ",
        ]);

        // 1 + 4 + 0 + 2 + 3 + 1
        assert_eq!(InstrumentScorer::score(&row, &scheme).unwrap(), 11);
    }

    #[test]
    fn test_tokens_are_trimmed() {
        let scheme = CodingScheme::new(instruments::k6_config()).unwrap();
        let row = k6_row(&[
            " 少しだけ ",
            "いつも",
            "全くない",
            "ときどき",
            "たいてい",
            "少しだけ ",
        ]);

        assert_eq!(InstrumentScorer::score(&row, &scheme).unwrap(), 11);
    }

    #[test]
    fn test_unknown_token_voids_the_total() {
        let scheme = CodingScheme::new(instruments::k6_config()).unwrap();
        let row = k6_row(&["少しだけ", "", "全くない", "ときどき", "たいてい", "少しだけ"]);

        let err = InstrumentScorer::score(&row, &scheme).unwrap_err();
        match err {
            ScoreError::UnknownResponseToken {
                instrument,
                participant,
                item,
                token,
            } => {
                assert_eq!(instrument, "k6_score");
                assert_eq!(participant, "7");
                assert_eq!(item, 2);
                assert_eq!(token, "");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_truncated_row() {
        let scheme = CodingScheme::new(instruments::k6_config()).unwrap();
        let row = k6_row(&["少しだけ", "いつも"]); // 7 columns, needs 11

        let err = InstrumentScorer::score(&row, &scheme).unwrap_err();
        match err {
            ScoreError::TruncatedRow {
                expected, actual, ..
            } => {
                assert_eq!(expected, 11);
                assert_eq!(actual, 7);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_reverse_items_sum_mirrored() {
        let config = SchemeConfig {
            name: "mini".to_string(),
            first_column: 2,
            last_column: 4,
            max_ordinal: 3,
            regular: BTreeMap::from([
                ("1".to_string(), 0),
                ("2".to_string(), 1),
                ("3".to_string(), 2),
                ("4".to_string(), 3),
            ]),
            reverse_items: BTreeSet::from([2]),
        };
        let scheme = CodingScheme::new(config).unwrap();
        let row = RawResponseRow::new(
            ["01/01/2020 10:00:00", "3", "4", "4", "4"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );

        // 3 + (3 - 3) + 3
        assert_eq!(InstrumentScorer::score(&row, &scheme).unwrap(), 6);
    }

    #[test]
    fn test_srs2_all_lowest_tokens() {
        let scheme = CodingScheme::new(instruments::srs2_config()).unwrap();
        let mut fields: Vec<String> = vec!["01/01/2020 10:00:00".into(), "5".into()];
        fields.resize(11, String::new());
        fields.extend(std::iter::repeat("1".to_string()).take(65));
        let row = RawResponseRow::new(fields);

        // Token "1" codes 0 on 50 regular items and 3 on the 15 reverse items.
        assert_eq!(InstrumentScorer::score(&row, &scheme).unwrap(), 45);
    }
}
