pub mod evaluator;
pub mod extract;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod validate;

pub use evaluator::{EvaluationError, EvaluationService};
pub use extract::extract_json_object;
pub use prompt::build_prompt;
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use validate::{validate_result, JsonKind, SchemaIssue};
