//! Prompt construction for pitch evaluation.

/// Fixed instruction describing the exact JSON shape the model must return.
pub const SYSTEM_PROMPT: &str = r#"
You are an AI evaluation engine.

Return ONLY a JSON object exactly like this:

{
  "score": number,
  "category_scores": {
    "clarity": number,
    "depth": number,
    "structure": number
  },
  "insights": ["string"],
  "verdict": "string"
}

Rules:
- Do NOT add commentary.
- Do NOT add explanation.
- Do NOT add markdown.
- Strict JSON only.
"#;

const FENCE: &str = "```";

/// Build the single prompt string sent to the model for one transcript.
///
/// Markdown fences inside the transcript are replaced with a single quote so
/// they cannot close the `"""` block early. Nothing else is escaped.
pub fn build_prompt(transcript: &str) -> String {
    let mut prompt = String::with_capacity(SYSTEM_PROMPT.len() + transcript.len() + 64);
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str(&user_prompt(transcript));
    prompt
}

fn user_prompt(transcript: &str) -> String {
    format!(
        "\nEvaluate this pitch transcript:\n\n\"\"\"{}\"\"\"\n",
        transcript.replace(FENCE, "'")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_starts_with_system_instruction() {
        let prompt = build_prompt("Hi, I'm Alex...");
        assert!(prompt.starts_with(SYSTEM_PROMPT));
        assert!(prompt.contains("\"\"\"Hi, I'm Alex...\"\"\""));
    }

    #[test]
    fn fences_in_transcript_are_neutralised() {
        let prompt = build_prompt("before ```json {} ``` after");
        let user_part = &prompt[SYSTEM_PROMPT.len()..];
        assert!(!user_part.contains("```"));
        assert!(user_part.contains("before 'json {} ' after"));
    }

    #[test]
    fn other_characters_pass_through() {
        let prompt = build_prompt("quotes \"\" and {braces} and `one` ``two``");
        assert!(prompt.contains("quotes \"\" and {braces} and `one` ``two``"));
    }

    #[test]
    fn empty_transcript_still_builds() {
        let prompt = build_prompt("");
        assert!(prompt.ends_with("\"\"\"\"\"\"\n"));
    }
}
