//! SQL identifier quoting.
//!
//! Table and column names come from regex captures and CSV header rows, so
//! they can contain anything a file name or spreadsheet author can produce.
//! Every identifier emitted into SQL text goes through [`quote`]; raw names
//! are never concatenated into statements.

use crate::error::IngestError;

/// Wraps `name` in double quotes, doubling any embedded quote character.
///
/// A NUL byte cannot appear in a SQLite identifier at all, so names
/// containing one are rejected rather than truncated.
pub fn quote(name: &str) -> Result<String, IngestError> {
    if name.contains('\0') {
        return Err(IngestError::Identifier(name.to_string()));
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for ch in name.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    Ok(quoted)
}

/// Inverts [`quote`]. Returns `None` when `quoted` is not a well-formed
/// double-quoted identifier.
pub fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut name = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            // only a doubled quote is legal inside the delimiters
            if chars.next() != Some('"') {
                return None;
            }
        }
        name.push(ch);
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_wraps_plain_names() {
        assert_eq!(quote("amount").unwrap(), "\"amount\"");
        assert_eq!(quote("first name").unwrap(), "\"first name\"");
        assert_eq!(quote("total; drop table x").unwrap(), "\"total; drop table x\"");
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote("say \"hi\"").unwrap(), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn quote_rejects_nul() {
        assert!(matches!(quote("a\0b"), Err(IngestError::Identifier(_))));
    }

    #[test]
    fn unquote_round_trips() {
        for name in ["id", "first name", "say \"hi\"", "", "quote\"at\"middle"] {
            assert_eq!(unquote(&quote(name).unwrap()).as_deref(), Some(name));
        }
    }

    #[test]
    fn unquote_rejects_malformed_input() {
        assert_eq!(unquote("no quotes"), None);
        assert_eq!(unquote("\"dangling"), None);
        assert_eq!(unquote("\"lone\"quote\""), None);
    }
}
