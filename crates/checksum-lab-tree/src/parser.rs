use crate::error::ParseError;
use crate::grammar::{Grammar, is_nonterminal};
use crate::tree::DerivationTree;

/// Backtracking PEG parser: alternatives are tried in order and the first
/// one that matches wins. Grammars must not be left-recursive.
///
/// Recursion depth follows the nesting of rules, not the input length, as
/// long as unbounded sequences are written as repetitions.
pub struct Parser<'g> {
    grammar: &'g Grammar,
    start: String,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar, start: impl Into<String>) -> Result<Self, ParseError> {
        let start = start.into();
        if !grammar.contains(&start) {
            return Err(ParseError::UnknownStartSymbol(start));
        }
        Ok(Self { grammar, start })
    }

    /// Parses the whole of `input` into a tree rooted at the start symbol.
    pub fn parse(&self, input: &str) -> Result<DerivationTree, ParseError> {
        let mut furthest = 0;
        match self.parse_symbol(&self.start, input, 0, &mut furthest) {
            Some((tree, end)) if end == input.len() => Ok(tree),
            Some((_, end)) => Err(ParseError::TrailingInput { offset: end }),
            None => Err(ParseError::NoMatch {
                symbol: self.start.clone(),
                offset: furthest,
            }),
        }
    }

    fn parse_symbol(
        &self,
        symbol: &str,
        input: &str,
        pos: usize,
        furthest: &mut usize,
    ) -> Option<(DerivationTree, usize)> {
        if !is_nonterminal(symbol) {
            if input[pos..].starts_with(symbol) {
                return Some((DerivationTree::leaf(symbol), pos + symbol.len()));
            }
            *furthest = (*furthest).max(pos);
            return None;
        }

        if let Some(item) = self.grammar.repeated(symbol) {
            let mut children = Vec::new();
            let mut cursor = pos;
            while let Some((child, next)) = self.parse_symbol(item, input, cursor, furthest) {
                if next == cursor {
                    break;
                }
                children.push(child);
                cursor = next;
            }
            return Some((DerivationTree::node(symbol, children), cursor));
        }

        let alternatives = self.grammar.alternatives(symbol)?;
        'alternatives: for expansion in alternatives {
            let mut children = Vec::with_capacity(expansion.len());
            let mut cursor = pos;
            for part in expansion {
                match self.parse_symbol(part, input, cursor, furthest) {
                    Some((child, next)) => {
                        children.push(child);
                        cursor = next;
                    }
                    None => continue 'alternatives,
                }
            }
            return Some((DerivationTree::node(symbol, children), cursor));
        }
        None
    }
}
