/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Brace-template parser.
//!
//! Converts template source text into an ordered list of [`Segment`]s.
//! The scanner works on `char`s, so offsets reported in errors are
//! character offsets, not byte offsets.

use crate::ast::{Accessor, FieldKey, Literal, Placeholder, Segment};
use crate::error::{TemplateError, TemplateResult};
use std::str::FromStr;

/// Default limit for fields nested inside format specs.
///
/// One level allows `{x:{width}}` but rejects `{x:{w:{y}}}`.
pub const DEFAULT_MAX_SPEC_DEPTH: usize = 1;

/// A parsed template ready for substitution.
///
/// Templates are immutable: the source is parsed once, and the same
/// template can be substituted any number of times, from any number of
/// threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// The parsed segments, in source order.
    pub(crate) segments: Vec<Segment>,

    /// Original source.
    pub(crate) source: String,
}

impl Template {
    /// Parse a template from source text.
    pub fn parse(source: &str) -> TemplateResult<Self> {
        Self::parse_with_max_depth(source, DEFAULT_MAX_SPEC_DEPTH)
    }

    /// Parse a template, allowing fields to nest `max_spec_depth` levels
    /// deep inside format specs.
    pub fn parse_with_max_depth(source: &str, max_spec_depth: usize) -> TemplateResult<Self> {
        let chars: Vec<char> = source.chars().collect();
        let mut parser = Parser {
            chars: &chars,
            numbering: Numbering::Unset,
            max_spec_depth,
        };
        let segments = parser.parse_segments(0, chars.len(), 0)?;
        tracing::trace!(segments = segments.len(), "Parsed template");
        Ok(Self {
            segments,
            source: source.to_string(),
        })
    }

    /// The original source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed segments, in source order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Top-level placeholders, in source order.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    /// Keys referenced anywhere in the template (including inside format
    /// specs), unique, in order of first appearance.
    pub fn field_names(&self) -> Vec<FieldKey> {
        let mut keys: Vec<FieldKey> = Vec::new();
        for placeholder in self.placeholders() {
            for key in std::iter::once(placeholder)
                .chain(placeholder.nested_placeholders())
                .map(|p| &p.key)
            {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }
        keys
    }

    /// True when the template contains no placeholders.
    pub fn is_literal(&self) -> bool {
        self.placeholders().next().is_none()
    }
}

impl FromStr for Template {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::parse(s)
    }
}

/// Automatic (`{}`) vs manual (`{0}`) field numbering state.
///
/// A template must use one style or the other for positional fields.
#[derive(Debug, Clone, Copy)]
enum Numbering {
    Unset,
    Auto(usize),
    Manual,
}

struct Parser<'a> {
    chars: &'a [char],
    numbering: Numbering,
    max_spec_depth: usize,
}

impl Parser<'_> {
    /// Parse `chars[start..end]` into segments.
    fn parse_segments(
        &mut self,
        start: usize,
        end: usize,
        depth: usize,
    ) -> TemplateResult<Vec<Segment>> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut i = start;

        while i < end {
            match self.chars[i] {
                '{' if i + 1 < end && self.chars[i + 1] == '{' => {
                    literal.push('{');
                    i += 2;
                }
                '{' => {
                    let close = self.find_field_end(i, end)?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(Literal {
                            text: std::mem::take(&mut literal),
                        }));
                    }
                    let placeholder = self.parse_field(i, close, depth)?;
                    segments.push(Segment::Placeholder(placeholder));
                    i = close + 1;
                }
                '}' if i + 1 < end && self.chars[i + 1] == '}' => {
                    literal.push('}');
                    i += 2;
                }
                '}' => {
                    return Err(TemplateError::malformed(
                        "single '}' encountered in format string",
                        i,
                    ));
                }
                c => {
                    literal.push(c);
                    i += 1;
                }
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(Literal { text: literal }));
        }
        Ok(segments)
    }

    /// Find the brace closing the field opened at `open`.
    fn find_field_end(&self, open: usize, end: usize) -> TemplateResult<usize> {
        let mut level = 1usize;
        for i in open + 1..end {
            match self.chars[i] {
                '{' => level += 1,
                '}' => {
                    level -= 1;
                    if level == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        }
        Err(TemplateError::malformed(
            "expected '}' before end of string",
            open,
        ))
    }

    /// Parse the field between braces at `open` and `close`.
    fn parse_field(
        &mut self,
        open: usize,
        close: usize,
        depth: usize,
    ) -> TemplateResult<Placeholder> {
        let source: String = self.chars[open..=close].iter().collect();

        // The field name runs to the first `!` or `:` outside brackets.
        let name_start = open + 1;
        let mut j = name_start;
        let mut in_bracket = false;
        while j < close {
            match self.chars[j] {
                '[' => in_bracket = true,
                ']' => in_bracket = false,
                '!' | ':' if !in_bracket => break,
                _ => {}
            }
            j += 1;
        }
        let (key, accessors) = self.parse_field_name(name_start, j)?;

        let mut conversion = None;
        if j < close && self.chars[j] == '!' {
            if j + 1 >= close || self.chars[j + 1] == ':' {
                return Err(TemplateError::malformed(
                    "missing conversion specifier after '!'",
                    open,
                ));
            }
            conversion = Some(self.chars[j + 1]);
            j += 2;
            if j < close && self.chars[j] != ':' {
                return Err(TemplateError::malformed(
                    "expected ':' after conversion specifier",
                    open,
                ));
            }
        }

        let mut format_spec = String::new();
        let mut spec_segments = None;
        if j < close {
            // chars[j] is ':'
            let spec_start = j + 1;
            format_spec = self.chars[spec_start..close].iter().collect();
            if format_spec.contains(['{', '}']) {
                if depth >= self.max_spec_depth {
                    return Err(TemplateError::malformed(
                        "max string recursion exceeded",
                        open,
                    ));
                }
                spec_segments = Some(self.parse_segments(spec_start, close, depth + 1)?);
            }
        }

        Ok(Placeholder {
            key,
            accessors,
            conversion,
            format_spec,
            spec_segments,
            source,
            offset: open,
        })
    }

    /// Parse `key(.attr|[item])*` from `chars[start..end]`.
    fn parse_field_name(
        &mut self,
        start: usize,
        end: usize,
    ) -> TemplateResult<(FieldKey, Vec<Accessor>)> {
        let mut i = start;
        while i < end && self.chars[i] != '.' && self.chars[i] != '[' {
            i += 1;
        }
        let key_text: String = self.chars[start..i].iter().collect();
        let key = self.field_key(&key_text, start)?;

        let mut accessors = Vec::new();
        while i < end {
            match self.chars[i] {
                '.' => {
                    let name_start = i + 1;
                    i = name_start;
                    while i < end && self.chars[i] != '.' && self.chars[i] != '[' {
                        i += 1;
                    }
                    if i == name_start {
                        return Err(TemplateError::malformed(
                            "empty attribute in format string",
                            start - 1,
                        ));
                    }
                    accessors.push(Accessor::Attr(self.chars[name_start..i].iter().collect()));
                }
                '[' => {
                    let item_start = i + 1;
                    let item_end = (item_start..end)
                        .find(|&k| self.chars[k] == ']')
                        .ok_or_else(|| {
                            TemplateError::malformed("missing ']' in format string", start - 1)
                        })?;
                    if item_end == item_start {
                        return Err(TemplateError::malformed(
                            "empty attribute in format string",
                            start - 1,
                        ));
                    }
                    let item: String = self.chars[item_start..item_end].iter().collect();
                    accessors.push(match item.parse::<usize>() {
                        Ok(index) if is_all_digits(&item) => Accessor::Index(index),
                        _ => Accessor::Key(item),
                    });
                    i = item_end + 1;
                    if i < end && self.chars[i] != '.' && self.chars[i] != '[' {
                        return Err(TemplateError::malformed(
                            "only '.' or '[' may follow ']' in format field specifier",
                            start - 1,
                        ));
                    }
                }
                _ => unreachable!("field name scan stops only at '.' or '['"),
            }
        }

        Ok((key, accessors))
    }

    /// Resolve the top-level key, assigning automatic numbers to empty keys.
    fn field_key(&mut self, text: &str, offset: usize) -> TemplateResult<FieldKey> {
        let open = offset - 1;
        if text.is_empty() {
            return match self.numbering {
                Numbering::Manual => Err(TemplateError::malformed(
                    "cannot switch from manual field numbering to automatic field numbering",
                    open,
                )),
                Numbering::Unset => {
                    self.numbering = Numbering::Auto(1);
                    Ok(FieldKey::Index(0))
                }
                Numbering::Auto(next) => {
                    self.numbering = Numbering::Auto(next + 1);
                    Ok(FieldKey::Index(next))
                }
            };
        }

        if is_all_digits(text) {
            let index = text.parse::<usize>().map_err(|_| {
                TemplateError::malformed("too many decimal digits in format string", open)
            })?;
            if let Numbering::Auto(_) = self.numbering {
                return Err(TemplateError::malformed(
                    "cannot switch from automatic field numbering to manual field specification",
                    open,
                ));
            }
            self.numbering = Numbering::Manual;
            return Ok(FieldKey::Index(index));
        }

        Ok(FieldKey::Name(text.to_string()))
    }
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Template {
        Template::parse(source).expect("template should parse")
    }

    fn parse_err(source: &str) -> String {
        match Template::parse(source) {
            Err(TemplateError::MalformedTemplate { message, .. }) => message,
            other => panic!("expected MalformedTemplate, got {:?}", other),
        }
    }

    fn only_placeholder(template: &Template) -> &Placeholder {
        let placeholders: Vec<_> = template.placeholders().collect();
        assert_eq!(placeholders.len(), 1);
        placeholders[0]
    }

    #[test]
    fn test_literal_only() {
        let template = parse("Hello, world!");
        assert_eq!(
            template.segments(),
            &[Segment::Literal(Literal {
                text: "Hello, world!".to_string()
            })]
        );
        assert!(template.is_literal());
    }

    #[test]
    fn test_empty_template() {
        assert!(parse("").segments().is_empty());
    }

    #[test]
    fn test_escaped_braces_collapse() {
        let template = parse("{{}}");
        assert_eq!(
            template.segments(),
            &[Segment::Literal(Literal {
                text: "{}".to_string()
            })]
        );
    }

    #[test]
    fn test_segments_preserve_order() {
        let template = parse("a{x}b{0}c");
        let kinds: Vec<String> = template
            .segments()
            .iter()
            .map(|s| match s {
                Segment::Literal(l) => l.text.clone(),
                Segment::Placeholder(p) => p.source.clone(),
            })
            .collect();
        assert_eq!(kinds, vec!["a", "{x}", "b", "{0}", "c"]);
    }

    #[test]
    fn test_full_placeholder() {
        let template = parse("{name!r:>10}");
        let p = only_placeholder(&template);
        assert_eq!(p.key, FieldKey::Name("name".to_string()));
        assert_eq!(p.conversion, Some('r'));
        assert_eq!(p.format_spec, ">10");
        assert!(p.spec_segments.is_none());
        assert_eq!(p.source, "{name!r:>10}");
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_spec_may_contain_colons_and_bangs() {
        let template = parse("{t:%H:%M!}");
        let p = only_placeholder(&template);
        assert_eq!(p.format_spec, "%H:%M!");
    }

    #[test]
    fn test_accessors() {
        let template = parse("{0[name].first[2]}");
        let p = only_placeholder(&template);
        assert_eq!(p.key, FieldKey::Index(0));
        assert_eq!(
            p.accessors,
            vec![
                Accessor::Key("name".to_string()),
                Accessor::Attr("first".to_string()),
                Accessor::Index(2),
            ]
        );
    }

    #[test]
    fn test_bracket_may_contain_colon() {
        let template = parse("{m[a:b]:>4}");
        let p = only_placeholder(&template);
        assert_eq!(p.accessors, vec![Accessor::Key("a:b".to_string())]);
        assert_eq!(p.format_spec, ">4");
    }

    #[test]
    fn test_auto_numbering() {
        let template = parse("{} and {} and {name}");
        let keys: Vec<_> = template.placeholders().map(|p| p.key.clone()).collect();
        assert_eq!(
            keys,
            vec![
                FieldKey::Index(0),
                FieldKey::Index(1),
                FieldKey::Name("name".to_string())
            ]
        );
    }

    #[test]
    fn test_auto_numbering_counts_nested_fields() {
        let template = parse("{:{}} {}");
        let p: Vec<_> = template.placeholders().collect();
        assert_eq!(p[0].key, FieldKey::Index(0));
        assert_eq!(
            p[0].nested_placeholders().next().map(|n| n.key.clone()),
            Some(FieldKey::Index(1))
        );
        assert_eq!(p[1].key, FieldKey::Index(2));
    }

    #[test]
    fn test_mixed_numbering_is_malformed() {
        assert_eq!(
            parse_err("{} {0}"),
            "cannot switch from automatic field numbering to manual field specification"
        );
        assert_eq!(
            parse_err("{0} {}"),
            "cannot switch from manual field numbering to automatic field numbering"
        );
    }

    #[test]
    fn test_nested_spec() {
        let template = parse("{x:{fill}^{width}}");
        let p = only_placeholder(&template);
        assert_eq!(p.format_spec, "{fill}^{width}");
        let nested: Vec<_> = p.nested_placeholders().map(|n| n.key.clone()).collect();
        assert_eq!(
            nested,
            vec![
                FieldKey::Name("fill".to_string()),
                FieldKey::Name("width".to_string())
            ]
        );
    }

    #[test]
    fn test_nesting_too_deep() {
        assert_eq!(parse_err("{x:{y:{z}}}"), "max string recursion exceeded");
        assert!(Template::parse_with_max_depth("{x:{y:{z}}}", 2).is_ok());
    }

    #[test]
    fn test_unclosed_placeholder() {
        assert_eq!(parse_err("{unclosed"), "expected '}' before end of string");
        match Template::parse("abc{x") {
            Err(TemplateError::MalformedTemplate { offset, .. }) => assert_eq!(offset, 3),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_single_close_brace() {
        assert_eq!(parse_err("a } b"), "single '}' encountered in format string");
    }

    #[test]
    fn test_empty_conversion() {
        assert_eq!(parse_err("{x!}"), "missing conversion specifier after '!'");
        assert_eq!(parse_err("{x!:>3}"), "missing conversion specifier after '!'");
    }

    #[test]
    fn test_long_conversion() {
        assert_eq!(parse_err("{x!rs}"), "expected ':' after conversion specifier");
    }

    #[test]
    fn test_bad_accessors() {
        assert_eq!(parse_err("{a.}"), "empty attribute in format string");
        assert_eq!(parse_err("{a[]}"), "empty attribute in format string");
        assert_eq!(parse_err("{a[0}"), "missing ']' in format string");
        assert_eq!(
            parse_err("{a[0]x}"),
            "only '.' or '[' may follow ']' in format field specifier"
        );
    }

    #[test]
    fn test_unicode_offsets_are_chars() {
        let template = parse("héllo {名前}");
        let p = only_placeholder(&template);
        assert_eq!(p.key, FieldKey::Name("名前".to_string()));
        assert_eq!(p.offset, 6);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let source = "{0:>{1}} {{x}} {2!r}";
        assert_eq!(parse(source), parse(source));
    }

    #[test]
    fn test_field_names() {
        let template = parse("{a} {b:{w}} {a}");
        assert_eq!(
            template.field_names(),
            vec![
                FieldKey::Name("a".to_string()),
                FieldKey::Name("b".to_string()),
                FieldKey::Name("w".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_str() {
        let template: Template = "{x}".parse().unwrap();
        assert_eq!(template.source(), "{x}");
    }
}
