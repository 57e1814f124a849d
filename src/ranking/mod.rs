//! Candidate ranking: relevance scoring and the streaming dedup/rank stage

pub mod scorer;
pub mod stage;

pub use scorer::{is_relative_import, score, ImportAnatomy, Symbols};
pub use stage::{Candidate, RankStage, RankStats, ScoredCandidate, DEFAULT_BATCH_SIZE};
