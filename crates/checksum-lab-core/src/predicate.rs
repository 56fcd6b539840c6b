use std::fmt;

use checksum_lab_tree::DerivationTree;

use crate::error::{EvalError, Result};
use crate::evaluator::{Evaluation, evaluate};

pub type PredicateFn = fn(&[DerivationTree]) -> Result<Evaluation>;

/// A named semantic constraint a solver can evaluate over tree arguments.
#[derive(Clone, Copy)]
pub struct SemanticPredicate {
    pub name: &'static str,
    pub arity: usize,
    /// Whether the predicate claims ownership of its tree arguments. The
    /// checksum predicate only reads them until a correction is returned.
    pub binds_tree: bool,
    eval: PredicateFn,
}

impl SemanticPredicate {
    pub fn evaluate(&self, args: &[DerivationTree]) -> Result<Evaluation> {
        if args.len() != self.arity {
            return Err(EvalError::Arity {
                name: self.name,
                expected: self.arity,
                actual: args.len(),
            });
        }
        (self.eval)(args)
    }
}

impl fmt::Debug for SemanticPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticPredicate")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("binds_tree", &self.binds_tree)
            .finish()
    }
}

/// `internet_checksum(header, checksum)`
pub const INTERNET_CHECKSUM: SemanticPredicate = SemanticPredicate {
    name: "internet_checksum",
    arity: 2,
    binds_tree: false,
    eval: internet_checksum,
};

fn internet_checksum(args: &[DerivationTree]) -> Result<Evaluation> {
    evaluate(&args[0], &args[1])
}

pub fn predicates() -> Vec<SemanticPredicate> {
    vec![INTERNET_CHECKSUM]
}

pub fn predicate_by_name(name: &str) -> Result<SemanticPredicate> {
    predicates()
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| EvalError::UnknownPredicate(name.to_string()))
}
