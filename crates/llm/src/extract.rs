//! Recovery of a JSON object embedded in free-form model output.
//!
//! Scans for the outermost braces and parses what lies between. Prose that
//! itself contains braces can defeat this; callers only depend on
//! [`extract_json_object`] so a stricter scanner can replace it.

use serde_json::Value;
use tracing::debug;

/// Parse the substring from the first `{` through the last `}`.
///
/// Returns `None` when there is no such span or when it is not valid JSON;
/// the two cases are deliberately not distinguished.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str(&text[start..=end]) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, "brace span is not valid JSON");
            None
        }
    }
}
