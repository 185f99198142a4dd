//! psyscore - Response deduplication and multi-instrument questionnaire scoring
//!
//! psyscore turns raw multi-item questionnaire submissions into per-participant
//! psychometric scores through a deterministic pipeline: deduplication (latest
//! submission per participant) → per-instrument item coding (including
//! reverse-scored items) → id-keyed merge into one score table.
//!
//! ## Modules
//!
//! - **coding**: `scheme.v1` coding scheme configuration and validation
//! - **instruments**: built-in K6 and SRS-2 scheme definitions
//! - **dedup**: canonical response selection by latest timestamp
//! - **scorer**: per-instrument total scoring
//! - **table**: accumulating id-keyed score table
//! - **pipeline**: one-shot and incremental orchestration

pub mod coding;
pub mod dedup;
pub mod error;
pub mod instruments;
pub mod pipeline;
pub mod scorer;
pub mod table;
pub mod types;

pub use coding::{CodingScheme, SchemeConfig, SCHEME_VERSION};
pub use dedup::{Deduplicator, TIMESTAMP_FORMAT};
pub use error::ScoreError;
pub use pipeline::{score_responses, ScoreProcessor};
pub use scorer::InstrumentScorer;
pub use table::ScoreTable;
pub use types::{CanonicalResponseSet, RawResponseRow};

/// psyscore version embedded in CLI output
pub const PSYSCORE_VERSION: &str = env!("CARGO_PKG_VERSION");
