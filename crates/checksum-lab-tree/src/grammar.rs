use std::collections::BTreeMap;

use crate::error::TreeError;

/// One alternative of a rule: a sequence of nonterminals (`<name>`) and
/// literal terminals. An empty sequence matches the empty string.
pub type Expansion = Vec<String>;

/// `<name>` style symbols are nonterminals; anything else is literal text.
pub fn is_nonterminal(symbol: &str) -> bool {
    symbol.len() > 2 && symbol.starts_with('<') && symbol.ends_with('>')
}

/// One single-character terminal alternative per character of `chars`.
pub fn srange(chars: &str) -> Vec<Expansion> {
    chars.chars().map(|c| vec![c.to_string()]).collect()
}

/// Context-free grammar with ordered alternatives.
///
/// Besides ordinary rules a nonterminal can be a repetition: zero or more
/// occurrences of one item symbol, parsed into a flat list of children.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: BTreeMap<String, Vec<Expansion>>,
    repetitions: BTreeMap<String, String>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, nonterminal: impl Into<String>, alternatives: Vec<Expansion>) -> Self {
        let nonterminal = nonterminal.into();
        self.repetitions.remove(&nonterminal);
        self.rules.insert(nonterminal, alternatives);
        self
    }

    /// `nonterminal ::= item*`, matched greedily.
    pub fn repeat(mut self, nonterminal: impl Into<String>, item: impl Into<String>) -> Self {
        let nonterminal = nonterminal.into();
        self.rules.remove(&nonterminal);
        self.repetitions.insert(nonterminal, item.into());
        self
    }

    pub fn alternatives(&self, nonterminal: &str) -> Option<&[Expansion]> {
        self.rules.get(nonterminal).map(|alts| alts.as_slice())
    }

    /// Item symbol of a repetition rule.
    pub fn repeated(&self, nonterminal: &str) -> Option<&str> {
        self.repetitions.get(nonterminal).map(|item| item.as_str())
    }

    pub fn contains(&self, nonterminal: &str) -> bool {
        self.rules.contains_key(nonterminal) || self.repetitions.contains_key(nonterminal)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
        self.rules
            .keys()
            .chain(self.repetitions.keys())
            .map(|k| k.as_str())
    }

    /// Every nonterminal used on a right-hand side must have a rule.
    pub fn validate(&self) -> Result<(), TreeError> {
        let used = self
            .rules
            .values()
            .flat_map(|alternatives| alternatives.iter().flatten())
            .chain(self.repetitions.values());
        for symbol in used {
            if is_nonterminal(symbol) && !self.contains(symbol) {
                return Err(TreeError::UndefinedNonterminal {
                    symbol: symbol.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Builds an expansion from string slices.
pub fn seq(symbols: &[&str]) -> Expansion {
    symbols.iter().map(|s| s.to_string()).collect()
}
