// crosscheck-core/src/domain/quality/mod.rs

pub mod evaluator;
pub mod value;
pub mod verdict;

pub use evaluator::RuleEvaluator;
pub use value::{FetchOutcome, ScalarValue};
pub use verdict::{UnavailableReason, Verdict};
