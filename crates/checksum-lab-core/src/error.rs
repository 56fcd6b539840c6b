use checksum_lab_tree::{NodeId, ParseError, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("checksum field {0} is not part of the header")]
    FieldNotFound(NodeId),

    #[error("header text is not valid hex: {0}")]
    HeaderHex(#[from] hex::FromHexError),

    #[error("computed checksum text {0:?} does not parse as a checksum: {1}")]
    Synthesis(String, #[source] ParseError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("unknown predicate {0:?}")]
    UnknownPredicate(String),

    #[error("predicate {name} takes {expected} arguments, got {actual}")]
    Arity {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("ICMP packet needs at least {expected} bytes, got {actual}")]
    TruncatedPacket { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, EvalError>;
