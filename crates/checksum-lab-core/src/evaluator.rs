//! Evaluation and repair of a checksum field inside a derivation tree.
//!
//! The header tree renders to hex-pair text (`"08 00 F7 FF ..."`). The field
//! is zero-filled, the header bytes are summed in reverse text order, and the
//! result is compared with what the field currently holds. A mismatch yields
//! a [`Correction`] that maps the field to a freshly parsed replacement.

use checksum_lab_tree::{DerivationTree, Parser, Path, strip_whitespace};
use tracing::{debug, info};

use crate::checksum::{
    CHECKSUM_GRAMMAR_START, checksum_grammar, format_checksum, internet_checksum,
};
use crate::error::{EvalError, Result};

/// Outcome of one evaluation.
#[derive(Debug, Clone)]
pub enum Evaluation {
    /// The header still has open nodes; ask again once it is complete.
    NotReady,
    Valid,
    /// The field cannot hold a checksum (odd number of hex digits).
    Invalid,
    Correction(Correction),
}

impl Evaluation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Evaluation::Valid)
    }

    pub fn correction(&self) -> Option<&Correction> {
        match self {
            Evaluation::Correction(correction) => Some(correction),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Evaluation::NotReady => "not_ready",
            Evaluation::Valid => "valid",
            Evaluation::Invalid => "invalid",
            Evaluation::Correction(_) => "correction",
        }
    }
}

/// Replacement for a checksum field. The caller decides whether to apply it.
#[derive(Debug, Clone)]
pub struct Correction {
    field: DerivationTree,
    replacement: DerivationTree,
}

impl Correction {
    /// The field sub-tree that should be replaced.
    pub fn field(&self) -> &DerivationTree {
        &self.field
    }

    pub fn replacement(&self) -> &DerivationTree {
        &self.replacement
    }

    /// Substitutes the replacement for the field, returning a new header.
    pub fn apply(&self, header: &DerivationTree) -> Result<DerivationTree> {
        let path = header
            .find_path(self.field.id())
            .ok_or(EvalError::FieldNotFound(self.field.id()))?;
        Ok(header.replace_at_path(&path, self.replacement.clone())?)
    }
}

/// Decides whether `field` holds the Internet checksum of `header`.
///
/// `field` must be a node of `header` (matched by identity). Neither tree is
/// modified.
pub fn evaluate(header: &DerivationTree, field: &DerivationTree) -> Result<Evaluation> {
    if !header.is_complete() {
        debug!("header is not fully instantiated yet");
        return Ok(Evaluation::NotReady);
    }

    let path = header
        .find_path(field.id())
        .ok_or(EvalError::FieldNotFound(field.id()))?;

    let field_text = field.render();
    let current = strip_whitespace(&field_text);
    if current.len() % 2 != 0 {
        debug!(field = %field_text, "checksum field has an odd number of digits");
        return Ok(Evaluation::Invalid);
    }

    let value = compute_checksum(header, field, &path)?;
    let expected = format_checksum(value);
    debug!(path = %path, current = %current, expected = %expected, "computed checksum");

    if strip_whitespace(&expected) == current {
        return Ok(Evaluation::Valid);
    }

    let replacement = synthesize(field, &expected)?;
    if strip_whitespace(&replacement.render()) == current {
        return Ok(Evaluation::Valid);
    }

    info!(from = %field_text, to = %expected, "checksum correction");
    Ok(Evaluation::Correction(Correction {
        field: field.clone(),
        replacement,
    }))
}

/// Checksum of `header` with the field at `path` zeroed, in the byte order
/// the field is written in.
fn compute_checksum(header: &DerivationTree, field: &DerivationTree, path: &Path) -> Result<u16> {
    let zeroed = header.replace_at_path(path, zero_fill(field))?;
    let mut bytes = hex::decode(strip_whitespace(&zeroed.render()))?;
    bytes.reverse();
    // Words were summed over reversed bytes; swap back to text order.
    Ok(internet_checksum(&bytes).swap_bytes())
}

/// Sub-tree of the field's symbol holding only zero digits, keeping a
/// trailing space if the field had one.
fn zero_fill(field: &DerivationTree) -> DerivationTree {
    let text = field.render();
    let mut zeros = "0".repeat(strip_whitespace(&text).len());
    if text.ends_with(char::is_whitespace) {
        zeros.push(' ');
    }
    DerivationTree::node(field.symbol(), vec![DerivationTree::leaf(zeros)])
}

fn synthesize(field: &DerivationTree, text: &str) -> Result<DerivationTree> {
    let parser = Parser::new(checksum_grammar(), CHECKSUM_GRAMMAR_START)
        .map_err(|err| EvalError::Synthesis(text.to_string(), err))?;
    let tree = parser
        .parse(text)
        .map_err(|err| EvalError::Synthesis(text.to_string(), err))?;
    Ok(tree.with_symbol(field.symbol()))
}
