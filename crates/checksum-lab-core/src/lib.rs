pub mod checksum;
pub mod error;
pub mod evaluator;
pub mod icmp;
pub mod predicate;
pub mod report;

pub use checksum::{CHECKSUM_GRAMMAR_START, checksum_grammar, format_checksum, internet_checksum};
pub use error::{EvalError, Result};
pub use evaluator::{Correction, Evaluation, evaluate};
pub use icmp::IcmpEcho;
pub use predicate::{INTERNET_CHECKSUM, SemanticPredicate, predicate_by_name, predicates};
pub use report::EvaluationReport;
