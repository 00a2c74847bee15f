pub mod api;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod schema;

pub use config::Config;
pub use error::*;
pub use evaluation::*;
pub use schema::{JsonKind, SchemaIssue};
