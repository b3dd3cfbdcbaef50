/*
 * dollar.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Dollar-style templates: `$name`, `${name}` and `$$`.
//!
//! A simpler sibling of the brace templates. Placeholders carry no
//! accessors, conversions or format specs; a bound value is inserted in its
//! display form. Identifiers are ASCII: `[_A-Za-z][_A-Za-z0-9]*`.
//!
//! The delimiter defaults to `$` and can be replaced with any non-empty
//! string.

use crate::error::{TemplateError, TemplateResult};
use crate::value::Args;

/// The default placeholder delimiter.
pub const DEFAULT_DELIMITER: &str = "$";

/// A dollar-style template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DollarTemplate {
    source: String,
    delimiter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    /// A doubled delimiter.
    Escaped,
    /// `$name` or `${name}`; `raw` is the full placeholder text.
    Named { name: &'a str, raw: &'a str },
    /// A delimiter followed by nothing usable. `at` is its byte offset.
    Invalid { at: usize },
}

impl DollarTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_delimiter(source, DEFAULT_DELIMITER)
    }

    pub fn with_delimiter(source: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            delimiter: delimiter.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Strict substitution using the named bindings in `args`.
    ///
    /// Fails with [`TemplateError::MissingKey`] for an unbound identifier and
    /// with [`TemplateError::MalformedTemplate`] for a delimiter that starts
    /// no valid placeholder.
    pub fn substitute(&self, args: &Args) -> TemplateResult<String> {
        let mut out = String::with_capacity(self.source.len());
        for piece in self.pieces() {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Escaped => out.push_str(&self.delimiter),
                Piece::Named { name, .. } => match args.get_named(name) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        return Err(TemplateError::MissingKey {
                            key: name.to_string(),
                        });
                    }
                },
                Piece::Invalid { at } => return Err(self.invalid_placeholder(at)),
            }
        }
        Ok(out)
    }

    /// Substitution that never fails: unbound identifiers and invalid
    /// delimiters are copied to the output unchanged.
    pub fn safe_substitute(&self, args: &Args) -> String {
        let mut out = String::with_capacity(self.source.len());
        for piece in self.pieces() {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Escaped => out.push_str(&self.delimiter),
                Piece::Named { name, raw } => match args.get_named(name) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => {
                        tracing::debug!(key = name, "Missing key left as literal");
                        out.push_str(raw);
                    }
                },
                Piece::Invalid { .. } => out.push_str(&self.delimiter),
            }
        }
        out
    }

    /// True when every delimiter starts a valid placeholder or escape.
    pub fn is_valid(&self) -> bool {
        !self
            .pieces()
            .iter()
            .any(|piece| matches!(piece, Piece::Invalid { .. }))
    }

    /// Identifiers in order of first appearance, without duplicates.
    pub fn get_identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for piece in self.pieces() {
            if let Piece::Named { name, .. } = piece {
                if !ids.iter().any(|id| id == name) {
                    ids.push(name.to_string());
                }
            }
        }
        ids
    }

    fn pieces(&self) -> Vec<Piece<'_>> {
        let source = self.source.as_str();
        let delim = self.delimiter.as_str();
        if delim.is_empty() {
            return vec![Piece::Text(source)];
        }

        let mut pieces = Vec::new();
        let mut pos = 0;
        while let Some(found) = source[pos..].find(delim) {
            let start = pos + found;
            if start > pos {
                pieces.push(Piece::Text(&source[pos..start]));
            }
            let after = start + delim.len();
            let rest = &source[after..];

            if rest.starts_with(delim) {
                pieces.push(Piece::Escaped);
                pos = after + delim.len();
            } else if let Some(len) = identifier_len(rest) {
                pieces.push(Piece::Named {
                    name: &rest[..len],
                    raw: &source[start..after + len],
                });
                pos = after + len;
            } else if let Some(len) = rest.strip_prefix('{').and_then(braced_len) {
                // `{` + identifier + `}`
                let end = after + len + 2;
                pieces.push(Piece::Named {
                    name: &rest[1..=len],
                    raw: &source[start..end],
                });
                pos = end;
            } else {
                pieces.push(Piece::Invalid { at: start });
                pos = after;
            }
        }
        if pos < source.len() {
            pieces.push(Piece::Text(&source[pos..]));
        }
        pieces
    }

    fn invalid_placeholder(&self, at: usize) -> TemplateError {
        let before = &self.source[..at];
        let line = before.matches('\n').count() + 1;
        let col = before
            .rsplit('\n')
            .next()
            .map_or(0, |last| last.chars().count())
            + 1;
        TemplateError::malformed(
            format!("invalid placeholder in string: line {}, col {}", line, col),
            before.chars().count(),
        )
    }
}

/// Byte length of the ASCII identifier at the start of `text`.
fn identifier_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    Some(
        bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
            .count(),
    )
}

/// Length of the identifier in `name}...`, when the closing brace follows.
fn braced_len(text: &str) -> Option<usize> {
    let len = identifier_len(text)?;
    text[len..].starts_with('}').then_some(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    fn bindings() -> Args {
        Args::new()
            .with_named("who", "tim")
            .with_named("what", "kung pao")
            .with_named("n", 3)
    }

    #[test]
    fn test_substitute() {
        let template = DollarTemplate::new("$who likes ${what}, $$${n} each");
        assert_eq!(
            template.substitute(&bindings()).unwrap(),
            "tim likes kung pao, $3 each"
        );
    }

    #[test]
    fn test_braced_identifier_adjacent_text() {
        let template = DollarTemplate::new("${who}ward $whoward");
        assert_eq!(
            template
                .substitute(&bindings().with_named("whoward", "x"))
                .unwrap(),
            "timward x"
        );
    }

    #[test]
    fn test_missing_key() {
        let template = DollarTemplate::new("$who likes $food");
        assert_eq!(
            template.substitute(&bindings()).unwrap_err(),
            TemplateError::MissingKey {
                key: "food".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_placeholder_position() {
        let template = DollarTemplate::new("line one\nprice: $5");
        assert_snapshot!(
            template.substitute(&bindings()).unwrap_err(),
            @"Malformed template at offset 16: invalid placeholder in string: line 2, col 8"
        );
        assert!(!template.is_valid());
    }

    #[test]
    fn test_safe_substitute() {
        let template = DollarTemplate::new("$who owes ${amount} at $ 5% and ${ bad }");
        assert_eq!(
            template.safe_substitute(&bindings()),
            "tim owes ${amount} at $ 5% and ${ bad }"
        );
    }

    #[test]
    fn test_trailing_delimiter() {
        let template = DollarTemplate::new("cost: $");
        assert!(!template.is_valid());
        assert_eq!(template.safe_substitute(&Args::new()), "cost: $");
    }

    #[test]
    fn test_identifiers() {
        let template = DollarTemplate::new("$a ${b} $a $$c ${_c1} $9");
        assert_eq!(template.get_identifiers(), vec!["a", "b", "_c1"]);
        assert!(!template.is_valid());
        assert!(DollarTemplate::new("$a ${b} $$").is_valid());
    }

    #[test]
    fn test_non_ascii_identifier_is_invalid() {
        let template = DollarTemplate::new("$ñame");
        assert!(!template.is_valid());
        assert!(template.get_identifiers().is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let template = DollarTemplate::with_delimiter("%who paid %%%{n} for $what", "%");
        assert_eq!(
            template.substitute(&bindings()).unwrap(),
            "tim paid %3 for $what"
        );

        let template = DollarTemplate::with_delimiter("Hi <<who>>, <<<<", "<<");
        assert_eq!(template.get_identifiers(), vec!["who"]);
        assert_eq!(template.safe_substitute(&bindings()), "Hi tim>>, <<");
    }

    #[test]
    fn test_empty_delimiter_is_literal() {
        let template = DollarTemplate::with_delimiter("$who", "");
        assert!(template.is_valid());
        assert_eq!(template.substitute(&bindings()).unwrap(), "$who");
    }
}
