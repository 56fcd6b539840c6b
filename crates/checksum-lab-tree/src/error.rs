use thiserror::Error;

use crate::tree::Path;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("path {0} does not address a node")]
    InvalidPath(Path),

    #[error("nonterminal {symbol} is referenced but has no rule")]
    UndefinedNonterminal { symbol: String },

    #[error("invalid hex digit {digit:?} at offset {offset}")]
    InvalidHexDigit { digit: char, offset: usize },

    #[error("hex text has an odd number of digits ({0})")]
    OddHexLength(usize),

    #[error("invalid layout: {0}")]
    Layout(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("grammar has no rule for start symbol {0}")]
    UnknownStartSymbol(String),

    #[error("input does not match {symbol} (failed at offset {offset})")]
    NoMatch { symbol: String, offset: usize },

    #[error("unparsed input left at offset {offset}")]
    TrailingInput { offset: usize },
}
