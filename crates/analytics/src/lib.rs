//! Rolling evaluation history and the statistics derived from it.
//!
//! Nothing here is persisted incrementally: stats and tips are recomputed
//! from the current [`HistoryStore`] contents on every read.

pub mod history;
pub mod stats;
pub mod tips;

pub use history::{snippet, HistoryEntry, HistoryStore, HISTORY_CAPACITY};
pub use stats::{AggregateStats, CategoryAverages, ScoreBucket, SCORE_THRESHOLDS};
pub use tips::{generate_tips, tips_for};
