use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::grammar::{Grammar, seq, srange};

pub const HEADER_SYMBOL: &str = "<header>";
pub const PAYLOAD_SYMBOL: &str = "<payload>";
pub const BYTE_SYMBOL: &str = "<byte>";
pub const HEXDIGIT_SYMBOL: &str = "<hexdigit>";

const RESERVED_NAMES: [&str; 4] = ["header", "payload", "byte", "hexdigit"];

/// A fixed-width header field, measured in bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub bytes: usize,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, bytes: usize) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn symbol(&self) -> String {
        format!("<{}>", self.name)
    }
}

/// Describes how a hex header splits into fields and which field holds the
/// Internet checksum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderLayout {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub checksum_field: String,
    /// Whether arbitrary trailing bytes follow the fixed fields.
    pub payload: bool,
}

impl Default for HeaderLayout {
    fn default() -> Self {
        Self {
            name: "icmp_echo".to_string(),
            fields: vec![
                FieldSpec::new("type", 1),
                FieldSpec::new("code", 1),
                FieldSpec::new("checksum", 2),
                FieldSpec::new("identifier", 2),
                FieldSpec::new("sequence", 2),
            ],
            checksum_field: "checksum".to_string(),
            payload: true,
        }
    }
}

impl HeaderLayout {
    pub fn checksum_symbol(&self) -> String {
        format!("<{}>", self.checksum_field)
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty()
                || !field
                    .name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(TreeError::Layout(format!(
                    "field name {:?} must be non-empty and use [A-Za-z0-9_-]",
                    field.name
                )));
            }
            if RESERVED_NAMES.contains(&field.name.as_str()) {
                return Err(TreeError::Layout(format!(
                    "field name {:?} is reserved",
                    field.name
                )));
            }
            if field.bytes == 0 {
                return Err(TreeError::Layout(format!(
                    "field {:?} must be at least one byte wide",
                    field.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(TreeError::Layout(format!(
                    "field {:?} is declared twice",
                    field.name
                )));
            }
        }

        match self.fields.iter().find(|f| f.name == self.checksum_field) {
            Some(field) if field.bytes == 2 => Ok(()),
            Some(field) => Err(TreeError::Layout(format!(
                "checksum field {:?} must be 2 bytes wide, not {}",
                field.name, field.bytes
            ))),
            None => Err(TreeError::Layout(format!(
                "checksum field {:?} is not one of the fields",
                self.checksum_field
            ))),
        }
    }

    /// Grammar whose `<header>` rule accepts canonical hex text
    /// (`"XX YY ..."`) for this layout.
    pub fn grammar(&self) -> Result<Grammar, TreeError> {
        self.validate()?;

        let mut top: Vec<String> = self.fields.iter().map(FieldSpec::symbol).collect();
        if self.payload {
            top.push(PAYLOAD_SYMBOL.to_string());
        }

        let mut grammar = Grammar::new().rule(HEADER_SYMBOL, vec![top]);
        for field in &self.fields {
            let bytes = vec![BYTE_SYMBOL.to_string(); field.bytes];
            grammar = grammar.rule(field.symbol(), vec![bytes]);
        }
        if self.payload {
            grammar = grammar.repeat(PAYLOAD_SYMBOL, BYTE_SYMBOL);
        }
        grammar = grammar
            .rule(BYTE_SYMBOL, vec![seq(&[HEXDIGIT_SYMBOL, HEXDIGIT_SYMBOL, " "])])
            .rule(HEXDIGIT_SYMBOL, srange("0123456789ABCDEF"));

        grammar.validate()?;
        Ok(grammar)
    }
}

/// Partial layout, e.g. loaded from a TOML file, applied over a base layout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutOverride {
    pub name: Option<String>,
    pub fields: Option<Vec<FieldSpec>>,
    pub checksum_field: Option<String>,
    pub payload: Option<bool>,
}

impl LayoutOverride {
    pub fn apply_to(&self, layout: &mut HeaderLayout) {
        if let Some(v) = &self.name {
            layout.name = v.clone();
        }
        if let Some(v) = &self.fields {
            layout.fields = v.clone();
        }
        if let Some(v) = &self.checksum_field {
            layout.checksum_field = v.clone();
        }
        if let Some(v) = self.payload {
            layout.payload = v;
        }
    }
}
