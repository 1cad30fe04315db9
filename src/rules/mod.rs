//! Filename classification and session ordering rules.

mod classifier;
mod ordering;

pub use classifier::{classify, CompiledRule, SessionClassifier};
pub use ordering::{session_title, OrderingPolicy};
