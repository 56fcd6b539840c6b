pub mod error;
pub mod grammar;
pub mod layout;
pub mod parser;
pub mod text;
pub mod tree;

pub use error::{ParseError, TreeError};
pub use grammar::{Expansion, Grammar, is_nonterminal, seq, srange};
pub use layout::{FieldSpec, HeaderLayout, LayoutOverride};
pub use parser::Parser;
pub use text::{normalize_hex, strip_whitespace};
pub use tree::{DerivationTree, NodeId, Path};
