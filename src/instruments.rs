//! Built-in instrument definitions
//!
//! The two instruments used in the study, expressed as `scheme.v1`
//! configurations and run through the same validated constructor as
//! user-supplied schemes.
//!
//! - **K6** (psychological distress, 6 items): Japanese response tokens on a
//!   0–4 scale, no reverse items.
//! - **SRS-2** (social responsiveness, 65 items): numeric tokens 1–4 coded
//!   0–3, with 15 reverse-coded items.

use std::collections::{BTreeMap, BTreeSet};

use crate::coding::SchemeConfig;

/// Score column name for the K6 instrument
pub const K6_NAME: &str = "k6_score";

/// Score column name for the SRS-2 instrument
pub const SRS2_NAME: &str = "srs2_score";

/// K6 configuration: columns 5–10 of the survey export.
pub fn k6_config() -> SchemeConfig {
    SchemeConfig {
        name: K6_NAME.to_string(),
        first_column: 5,
        last_column: 10,
        max_ordinal: 4,
        regular: BTreeMap::from([
            ("全くない".to_string(), 0),
            ("少しだけ".to_string(), 1),
            ("ときどき".to_string(), 2),
            ("たいてい".to_string(), 3),
            ("いつも".to_string(), 4),
        ]),
        reverse_items: BTreeSet::new(),
    }
}

/// SRS-2 configuration: columns 11–75 of the survey export.
pub fn srs2_config() -> SchemeConfig {
    SchemeConfig {
        name: SRS2_NAME.to_string(),
        first_column: 11,
        last_column: 75,
        max_ordinal: 3,
        regular: BTreeMap::from([
            ("1".to_string(), 0), // あてはまらない
            ("2".to_string(), 1), // ときどきあてはまる
            ("3".to_string(), 2), // たいていあてはまる
            ("4".to_string(), 3), // ほとんどいつもあてはまる
        ]),
        reverse_items: BTreeSet::from([
            3, 7, 11, 12, 15, 17, 21, 22, 26, 32, 38, 40, 43, 45, 48,
        ]),
    }
}

/// Look up a built-in configuration by instrument name or score column name.
/// Feed the result through [`crate::coding::CodingScheme::new`] to score with it.
pub fn builtin(name: &str) -> Option<SchemeConfig> {
    match name {
        "k6" | K6_NAME => Some(k6_config()),
        "srs2" | "srs-2" | SRS2_NAME => Some(srs2_config()),
        _ => None,
    }
}

/// Names accepted by [`builtin`], for CLI help and reports.
pub fn builtin_names() -> &'static [&'static str] {
    &["k6", "srs2"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coding::CodingScheme;
    use pretty_assertions::assert_eq;

    fn k6() -> CodingScheme {
        CodingScheme::new(k6_config()).unwrap()
    }

    fn srs2() -> CodingScheme {
        CodingScheme::new(srs2_config()).unwrap()
    }

    #[test]
    fn test_k6_layout() {
        let scheme = k6();
        assert_eq!(scheme.name(), "k6_score");
        assert_eq!(scheme.first_column(), 5);
        assert_eq!(scheme.last_column(), 10);
        assert_eq!(scheme.item_count(), 6);
        assert_eq!(scheme.max_ordinal(), 4);
    }

    #[test]
    fn test_k6_token_codes() {
        let scheme = k6();
        assert_eq!(scheme.score(1, "全くない", "1").unwrap(), 0);
        assert_eq!(scheme.score(1, "少しだけ", "1").unwrap(), 1);
        assert_eq!(scheme.score(1, "ときどき", "1").unwrap(), 2);
        assert_eq!(scheme.score(1, "たいてい", "1").unwrap(), 3);
        assert_eq!(scheme.score(1, "いつも", "1").unwrap(), 4);
    }

    #[test]
    fn test_srs2_layout() {
        let scheme = srs2();
        assert_eq!(scheme.item_count(), 65);
        assert_eq!(scheme.first_column(), 11);
        assert_eq!(scheme.last_column(), 75);
    }

    #[test]
    fn test_srs2_reverse_items_mirror() {
        let scheme = srs2();
        // Item 3 is reverse-coded, item 1 is not.
        assert_eq!(scheme.score(1, "4", "1").unwrap(), 3);
        assert_eq!(scheme.score(3, "4", "1").unwrap(), 0);
        assert_eq!(scheme.score(3, "1", "1").unwrap(), 3);
        assert_eq!(scheme.score(3, "2", "1").unwrap(), 2);
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin("k6").is_some());
        assert!(builtin("srs-2").is_some());
        assert!(builtin("srs2_score").is_some());
        assert!(builtin("phq9").is_none());
    }
}
