use pitchsense_core::Category;
use serde::Serialize;

use crate::history::HistoryEntry;

/// Upper bounds of the five score buckets, compared with `<=` in order.
///
/// The first bucket also absorbs 0 and anything negative; scores above 1.0
/// are counted in the last bucket.
pub const SCORE_THRESHOLDS: [f64; 5] = [0.2, 0.4, 0.6, 0.8, 1.0];

const BUCKET_LABELS: [&str; 5] = ["0-0.2", "0.2-0.4", "0.4-0.6", "0.6-0.8", "0.8-1.0"];

/// Summary of the current history, derived on every read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub count: usize,
    /// Mean score; entries without a score count as 0.
    pub average_score: f64,
    pub best_score: f64,
    pub category_averages: CategoryAverages,
    /// Always five buckets, lowest first. Entries without a score are not bucketed.
    pub distribution: Vec<ScoreBucket>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryAverages {
    pub clarity: f64,
    pub depth: f64,
    pub structure: f64,
}

impl CategoryAverages {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Clarity => self.clarity,
            Category::Depth => self.depth,
            Category::Structure => self.structure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBucket {
    pub label: &'static str,
    pub upper: f64,
    pub count: usize,
}

/// Index of the bucket a score falls into.
pub fn bucket_index(score: f64) -> usize {
    SCORE_THRESHOLDS
        .iter()
        .position(|&upper| score <= upper)
        .unwrap_or(SCORE_THRESHOLDS.len() - 1)
}

fn empty_distribution() -> Vec<ScoreBucket> {
    SCORE_THRESHOLDS
        .iter()
        .zip(BUCKET_LABELS)
        .map(|(&upper, label)| ScoreBucket { label, upper, count: 0 })
        .collect()
}

impl AggregateStats {
    /// Compute stats over the given entries. Empty input yields zeroes.
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        let mut distribution = empty_distribution();

        let Some(first) = entries.first() else {
            return Self {
                distribution,
                ..Default::default()
            };
        };

        let count = entries.len();
        let n = count as f64;
        let score_of = |e: &HistoryEntry| e.score.unwrap_or(0.0);

        let total: f64 = entries.iter().map(score_of).sum();
        let best_score = entries
            .iter()
            .skip(1)
            .fold(score_of(first), |best, e| best.max(score_of(e)));

        let category_mean = |category: Category| {
            entries
                .iter()
                .map(|e| e.result.category(category).unwrap_or(0.0))
                .sum::<f64>()
                / n
        };

        for score in entries.iter().filter_map(|e| e.score) {
            distribution[bucket_index(score)].count += 1;
        }

        Self {
            count,
            average_score: total / n,
            best_score,
            category_averages: CategoryAverages {
                clarity: category_mean(Category::Clarity),
                depth: category_mean(Category::Depth),
                structure: category_mean(Category::Structure),
            },
            distribution,
        }
    }
}
