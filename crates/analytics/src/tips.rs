use crate::stats::{AggregateStats, CategoryAverages};

const OVERALL_THRESHOLD: f64 = 0.4;
const CATEGORY_THRESHOLD: f64 = 0.5;

const TIP_OVERALL: &str =
    "Work on the overall structure: open with the problem, follow with your solution, and close with a clear ask.";
const TIP_CLARITY: &str =
    "Improve clarity: use shorter sentences and state your core idea in the first few lines.";
const TIP_DEPTH: &str =
    "Add depth: back your claims with numbers, traction, or a concrete customer example.";
const TIP_STRUCTURE: &str =
    "Tighten the structure: give the pitch a clear beginning, middle, and end with smooth transitions.";
const TIP_KEEP_GOING: &str =
    "Great work! Your pitches are consistently strong. Keep refining your delivery.";

/// Improvement suggestions for the given averages.
///
/// Rules are checked in a fixed order and any number may fire. When none
/// does, a single encouragement message is returned.
pub fn generate_tips(overall: f64, categories: &CategoryAverages) -> Vec<&'static str> {
    let rules = [
        (overall < OVERALL_THRESHOLD, TIP_OVERALL),
        (categories.clarity < CATEGORY_THRESHOLD, TIP_CLARITY),
        (categories.depth < CATEGORY_THRESHOLD, TIP_DEPTH),
        (categories.structure < CATEGORY_THRESHOLD, TIP_STRUCTURE),
    ];

    let tips: Vec<&'static str> = rules
        .into_iter()
        .filter_map(|(fired, tip)| fired.then_some(tip))
        .collect();

    if tips.is_empty() {
        vec![TIP_KEEP_GOING]
    } else {
        tips
    }
}

pub fn tips_for(stats: &AggregateStats) -> Vec<&'static str> {
    generate_tips(stats.average_score, &stats.category_averages)
}
