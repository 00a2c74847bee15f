//! Schema validation of a parsed evaluation object.
//!
//! Every field is optional. A field that is present must have the expected
//! JSON type; `null` counts as present. Unknown keys are ignored and do not
//! appear in the validated record.

use pitchsense_core::{Category, CategoryScores, EvaluationResult};
use serde_json::{Map, Value};

pub use pitchsense_core::schema::{JsonKind, SchemaIssue};

#[derive(Default)]
struct Issues(Vec<SchemaIssue>);

impl Issues {
    fn mismatch(&mut self, path: impl Into<String>, expected: JsonKind, value: &Value) {
        let path = path.into();
        let received = JsonKind::of(value);
        let location = if path.is_empty() { "(root)" } else { path.as_str() };
        self.0.push(SchemaIssue {
            message: format!(
                "{location}: expected {}, received {}",
                expected.as_str(),
                received.as_str()
            ),
            path,
            expected,
            received,
        });
    }

    /// Check `key` is a number when present; yields the value if it is.
    fn number(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<f64> {
        let value = obj.get(key)?;
        match value.as_f64() {
            Some(n) => Some(n),
            None => {
                self.mismatch(path, JsonKind::Number, value);
                None
            }
        }
    }

    fn string(&mut self, obj: &Map<String, Value>, key: &str) -> Option<String> {
        let value = obj.get(key)?;
        match value.as_str() {
            Some(s) => Some(s.to_string()),
            None => {
                self.mismatch(key, JsonKind::String, value);
                None
            }
        }
    }
}

/// Validate a parsed object against the evaluation schema.
///
/// On success the typed record carries exactly the recognised fields that
/// were present. On failure every violation is reported; the input is never
/// coerced.
pub fn validate_result(value: &Value) -> Result<EvaluationResult, Vec<SchemaIssue>> {
    let mut issues = Issues::default();

    let Some(obj) = value.as_object() else {
        issues.mismatch("", JsonKind::Object, value);
        return Err(issues.0);
    };

    let score = issues.number(obj, "score", "score");
    let category_scores = validate_categories(obj, &mut issues);
    let insights = validate_insights(obj, &mut issues);
    let verdict = issues.string(obj, "verdict");

    if !issues.0.is_empty() {
        return Err(issues.0);
    }

    Ok(EvaluationResult {
        score,
        category_scores,
        insights,
        verdict,
    })
}

fn validate_categories(obj: &Map<String, Value>, issues: &mut Issues) -> Option<CategoryScores> {
    let value = obj.get("category_scores")?;
    let Some(map) = value.as_object() else {
        issues.mismatch("category_scores", JsonKind::Object, value);
        return None;
    };

    let mut scores = CategoryScores::default();
    for category in Category::ALL {
        let path = format!("category_scores.{}", category.as_str());
        let n = issues.number(map, category.as_str(), &path);
        match category {
            Category::Clarity => scores.clarity = n,
            Category::Depth => scores.depth = n,
            Category::Structure => scores.structure = n,
        }
    }
    Some(scores)
}

fn validate_insights(obj: &Map<String, Value>, issues: &mut Issues) -> Option<Vec<String>> {
    let value = obj.get("insights")?;
    let Some(items) = value.as_array() else {
        issues.mismatch("insights", JsonKind::Array, value);
        return None;
    };

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(s) => out.push(s.to_string()),
            None => issues.mismatch(format!("insights.{i}"), JsonKind::String, item),
        }
    }
    Some(out)
}
