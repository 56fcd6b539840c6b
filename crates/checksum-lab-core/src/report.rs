use checksum_lab_tree::{DerivationTree, strip_whitespace};
use serde::Serialize;

use crate::evaluator::Evaluation;

/// Serializable summary of one predicate evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub layout: String,
    pub predicate: String,
    pub outcome: &'static str,
    pub header: String,
    pub checksum_field: String,
    pub replacement: Option<String>,
    pub repaired_header: Option<String>,
}

impl EvaluationReport {
    pub fn new(
        layout: &str,
        predicate: &str,
        header: &DerivationTree,
        field: &DerivationTree,
        evaluation: &Evaluation,
    ) -> Self {
        Self {
            layout: layout.to_string(),
            predicate: predicate.to_string(),
            outcome: evaluation.label(),
            header: strip_whitespace(&header.render()),
            checksum_field: strip_whitespace(&field.render()),
            replacement: evaluation
                .correction()
                .map(|c| strip_whitespace(&c.replacement().render())),
            repaired_header: None,
        }
    }

    pub fn with_repaired_header(mut self, repaired: &DerivationTree) -> Self {
        self.repaired_header = Some(strip_whitespace(&repaired.render()));
        self
    }
}
