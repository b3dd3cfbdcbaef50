/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template AST types.
//!
//! A parsed template is a flat, ordered list of [`Segment`]s. Output is the
//! concatenation of the resolved segments in source order.

use std::fmt;

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text to be output as-is.
    Literal(Literal),

    /// Replacement field: `{key[accessors][!conversion][:format_spec]}`
    Placeholder(Placeholder),
}

/// Literal text segment.
///
/// Doubled braces have already been collapsed, so `{{` in the source is a
/// single `{` here.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub text: String,
}

/// The top-level key of a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    /// Zero-based positional argument (`{0}`, or an automatically numbered `{}`).
    Index(usize),
    /// Named argument (`{name}`).
    Name(String),
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Index(i) => write!(f, "{}", i),
            FieldKey::Name(n) => f.write_str(n),
        }
    }
}

/// A step of field access after the top-level key.
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// `.name`
    Attr(String),
    /// `[3]`
    Index(usize),
    /// `[name]`
    Key(String),
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Attr(name) => write!(f, ".{}", name),
            Accessor::Index(i) => write!(f, "[{}]", i),
            Accessor::Key(k) => write!(f, "[{}]", k),
        }
    }
}

/// A replacement field.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Top-level key.
    pub key: FieldKey,
    /// Field access chain applied to the bound value.
    pub accessors: Vec<Accessor>,
    /// Optional `!x` conversion tag.
    pub conversion: Option<char>,
    /// Raw format spec text (empty when absent).
    pub format_spec: String,
    /// Parsed spec, present only when the spec contains nested fields.
    pub spec_segments: Option<Vec<Segment>>,
    /// Exact source text of the placeholder, braces included.
    pub source: String,
    /// Character offset of the opening brace in the template.
    pub offset: usize,
}

impl Placeholder {
    /// Create a placeholder for a bare key with no conversion or spec.
    pub fn new(key: FieldKey, source: impl Into<String>, offset: usize) -> Self {
        Self {
            key,
            accessors: Vec::new(),
            conversion: None,
            format_spec: String::new(),
            spec_segments: None,
            source: source.into(),
            offset,
        }
    }

    /// The field path as written, e.g. `0[name].first`.
    pub fn field_path(&self) -> String {
        let mut path = self.key.to_string();
        for accessor in &self.accessors {
            path.push_str(&accessor.to_string());
        }
        path
    }

    /// Iterate over this placeholder and any placeholders nested in its spec.
    pub fn nested_placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.spec_segments
            .iter()
            .flatten()
            .filter_map(|segment| match segment {
                Segment::Placeholder(p) => Some(p),
                Segment::Literal(_) => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path() {
        let mut p = Placeholder::new(FieldKey::Index(0), "{0[name].first}", 0);
        p.accessors = vec![
            Accessor::Key("name".to_string()),
            Accessor::Attr("first".to_string()),
        ];
        assert_eq!(p.field_path(), "0[name].first");
    }

    #[test]
    fn test_field_key_display() {
        assert_eq!(FieldKey::Index(2).to_string(), "2");
        assert_eq!(FieldKey::Name("x".to_string()).to_string(), "x");
    }

    #[test]
    fn test_nested_placeholders() {
        let mut outer = Placeholder::new(FieldKey::Name("v".to_string()), "{v:{w}}", 0);
        assert_eq!(outer.nested_placeholders().count(), 0);

        outer.spec_segments = Some(vec![
            Segment::Literal(Literal {
                text: ">".to_string(),
            }),
            Segment::Placeholder(Placeholder::new(
                FieldKey::Name("w".to_string()),
                "{w}",
                3,
            )),
        ]);
        let nested: Vec<_> = outer.nested_placeholders().map(|p| p.key.clone()).collect();
        assert_eq!(nested, vec![FieldKey::Name("w".to_string())]);
    }
}
