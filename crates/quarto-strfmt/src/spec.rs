/*
 * spec.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Format-spec mini-language.
//!
//! ```text
//! [[fill]align][sign][#][0][width][grouping][.precision][type]
//! ```
//!
//! Parsing only checks the grammar. Whether a spec fits a particular
//! value is decided when the value is formatted (see [`crate::format`]).

use crate::error::{TemplateError, TemplateResult};
use std::str::FromStr;

/// Largest precision accepted in a spec.
pub const MAX_PRECISION: usize = i32::MAX as usize;

/// Alignment within the field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// `<`
    Left,
    /// `>`
    Right,
    /// `^`
    Center,
    /// `=`: padding goes between the sign/prefix and the digits.
    AfterSign,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        }
    }
}

/// Sign handling for numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// `+`: always show a sign.
    Plus,
    /// `-`: only negative numbers get a sign (the default).
    Minus,
    /// ` `: a space for non-negative numbers.
    Space,
}

/// Thousands separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Comma,
    Underscore,
}

impl Grouping {
    pub fn separator(self) -> char {
        match self {
            Grouping::Comma => ',',
            Grouping::Underscore => '_',
        }
    }
}

/// A parsed format spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSpec {
    pub fill: Option<char>,
    pub align: Option<Align>,
    pub sign: Option<Sign>,
    /// `#`
    pub alternate: bool,
    /// `0` before the width.
    pub zero_pad: bool,
    pub width: Option<usize>,
    pub grouping: Option<Grouping>,
    pub precision: Option<usize>,
    /// Presentation type, e.g. `d`, `f`, `x`.
    pub kind: Option<char>,
}

impl FormatSpec {
    /// Parse a format spec.
    pub fn parse(spec: &str) -> TemplateResult<Self> {
        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = FormatSpec::default();
        let mut i = 0;

        if let Some(align) = chars.get(1).copied().and_then(Align::from_char) {
            parsed.fill = Some(chars[0]);
            parsed.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(Align::from_char) {
            parsed.align = Some(align);
            i = 1;
        }

        match chars.get(i) {
            Some('+') => parsed.sign = Some(Sign::Plus),
            Some('-') => parsed.sign = Some(Sign::Minus),
            Some(' ') => parsed.sign = Some(Sign::Space),
            _ => {}
        }
        if parsed.sign.is_some() {
            i += 1;
        }

        if chars.get(i) == Some(&'#') {
            parsed.alternate = true;
            i += 1;
        }

        if chars.get(i) == Some(&'0') {
            parsed.zero_pad = true;
            i += 1;
        }

        let (width, next) = parse_number(&chars, i, spec)?;
        parsed.width = width;
        i = next;

        match chars.get(i) {
            Some(',') => parsed.grouping = Some(Grouping::Comma),
            Some('_') => parsed.grouping = Some(Grouping::Underscore),
            _ => {}
        }
        if parsed.grouping.is_some() {
            i += 1;
            if matches!(chars.get(i), Some(',' | '_')) {
                return Err(TemplateError::invalid_spec(
                    spec,
                    "cannot specify both ',' and '_'",
                ));
            }
        }

        if chars.get(i) == Some(&'.') {
            let (precision, next) = parse_number(&chars, i + 1, spec)?;
            if precision.is_none() {
                return Err(TemplateError::invalid_spec(
                    spec,
                    "format specifier missing precision",
                ));
            }
            if precision.is_some_and(|p| p > MAX_PRECISION) {
                return Err(TemplateError::invalid_spec(spec, "precision too big"));
            }
            parsed.precision = precision;
            i = next;
        }

        if let Some(&kind) = chars.get(i) {
            parsed.kind = Some(kind);
            i += 1;
        }

        if i < chars.len() {
            return Err(TemplateError::invalid_spec(spec, "invalid format specifier"));
        }

        Ok(parsed)
    }

    /// True when nothing at all was specified.
    pub fn is_empty(&self) -> bool {
        *self == FormatSpec::default()
    }
}

impl FromStr for FormatSpec {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatSpec::parse(s)
    }
}

fn parse_number(
    chars: &[char],
    start: usize,
    spec: &str,
) -> TemplateResult<(Option<usize>, usize)> {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return Ok((None, start));
    }
    let digits: String = chars[start..end].iter().collect();
    let n = digits.parse::<usize>().map_err(|_| {
        TemplateError::invalid_spec(spec, "too many decimal digits in format string")
    })?;
    Ok((Some(n), end))
}
