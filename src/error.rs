//! Error types for psyscore

use thiserror::Error;

/// Errors that can occur while deduplicating or scoring responses.
///
/// Every variant is fatal for the run: all of them stem from malformed input,
/// and a partial or silently wrong score is worse than a hard stop. Variants
/// carry enough context to locate the offending row in the source data.
/// `row` counts data rows from 1, so with the usual header row it is the
/// file line minus one.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("data row {row}: timestamp {value:?} does not match MM/DD/YYYY HH:MM:SS")]
    MalformedTimestamp { row: usize, value: String },

    #[error("data row {row}: participant id {value:?} is not numeric")]
    InvalidParticipantId { row: usize, value: String },

    #[error("participant {participant}: row has {actual} columns but instrument {instrument} needs {expected}")]
    TruncatedRow {
        instrument: String,
        participant: String,
        expected: usize,
        actual: usize,
    },

    #[error("participant {participant}, instrument {instrument}, item {item}: unknown response token {token:?}")]
    UnknownResponseToken {
        instrument: String,
        participant: String,
        item: usize,
        token: String,
    },

    #[error("invalid coding scheme: {0}")]
    InvalidScheme(String),

    #[error("invalid score table JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
