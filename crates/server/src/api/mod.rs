//! HTTP endpoint modules.

pub mod doc;
mod evaluate;
mod health;

pub use evaluate::{evaluate, post_only};
pub use health::health;
