use serde::{Deserialize, Serialize};

/// Structured verdict on one pitch transcript.
///
/// Every field is optional: the model may return a partial object and that
/// is not an error. Only a present field with the wrong JSON type is rejected,
/// and that check happens once, at the boundary where model output is parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EvaluationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(
        default,
        alias = "categoryScores",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_scores: Option<CategoryScores>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CategoryScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<f64>,
}

/// The recognised scoring categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Clarity,
    Depth,
    Structure,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Clarity, Category::Depth, Category::Structure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Clarity => "clarity",
            Category::Depth => "depth",
            Category::Structure => "structure",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> Option<f64> {
        match category {
            Category::Clarity => self.clarity,
            Category::Depth => self.depth,
            Category::Structure => self.structure,
        }
    }
}

impl EvaluationResult {
    /// Score for one category, `None` when the category or the whole map is absent.
    pub fn category(&self, category: Category) -> Option<f64> {
        self.category_scores.as_ref().and_then(|c| c.get(category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_object_deserializes() {
        let r: EvaluationResult = serde_json::from_value(json!({ "verdict": "ok" })).unwrap();
        assert_eq!(r.verdict.as_deref(), Some("ok"));
        assert!(r.score.is_none());
        assert!(r.category_scores.is_none());
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let r = EvaluationResult {
            score: Some(0.5),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&r).unwrap(), json!({ "score": 0.5 }));
    }

    #[test]
    fn camel_case_category_alias_is_accepted() {
        let r: EvaluationResult =
            serde_json::from_value(json!({ "categoryScores": { "depth": 0.3 } })).unwrap();
        assert_eq!(r.category(Category::Depth), Some(0.3));
        assert_eq!(r.category(Category::Clarity), None);
    }
}
