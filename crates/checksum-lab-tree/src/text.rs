use crate::error::TreeError;

pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Canonical hex text: uppercase byte pairs, each followed by one space
/// (`"08 00 F7 FF "`). Accepts any whitespace and either case.
pub fn normalize_hex(text: &str) -> Result<String, TreeError> {
    let digits = strip_whitespace(text);
    if let Some((offset, digit)) = digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(TreeError::InvalidHexDigit { digit, offset });
    }
    if digits.len() % 2 != 0 {
        return Err(TreeError::OddHexLength(digits.len()));
    }

    let mut out = String::with_capacity(digits.len() / 2 * 3);
    for pair in digits.as_bytes().chunks(2) {
        out.push(char::from(pair[0]).to_ascii_uppercase());
        out.push(char::from(pair[1]).to_ascii_uppercase());
        out.push(' ');
    }
    Ok(out)
}
