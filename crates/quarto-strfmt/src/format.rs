/*
 * format.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in field formatting.
//!
//! Applies a parsed [`FormatSpec`] to a [`Value`]. Registered format hooks
//! run before this (see [`crate::registry`]); these are the fallbacks.

use crate::error::{TemplateError, TemplateResult};
use crate::spec::{Align, FormatSpec, Grouping, Sign};
use crate::value::{Value, float_repr, format_exponent};

const DEFAULT_FLOAT_PRECISION: usize = 6;

/// Format a value with the built-in format-spec mini-language.
///
/// An empty spec yields the value's display form.
pub fn format_value(value: &Value, spec_text: &str) -> TemplateResult<String> {
    if spec_text.is_empty() {
        return Ok(value.to_string());
    }
    let spec = FormatSpec::parse(spec_text)?;

    match value {
        Value::Str(s) => format_str(s, &spec, spec_text),
        Value::Int(i) => format_int(*i, &spec, spec_text),
        // Booleans behave like 1/0 under any non-empty spec.
        Value::Bool(b) => format_int(i64::from(*b), &spec, spec_text),
        Value::Float(x) => format_float(*x, &spec, spec_text),
        Value::List(_) | Value::Map(_) | Value::None => Err(TemplateError::invalid_spec(
            spec_text,
            format!(
                "unsupported format string passed to {} value",
                value.kind()
            ),
        )),
    }
}

fn format_str(s: &str, spec: &FormatSpec, spec_text: &str) -> TemplateResult<String> {
    if let Some(kind) = spec.kind.filter(|&k| k != 's') {
        return Err(unknown_code(spec_text, kind, "string"));
    }
    if spec.sign.is_some() {
        return Err(TemplateError::invalid_spec(
            spec_text,
            "sign not allowed in string format specifier",
        ));
    }
    if spec.alternate {
        return Err(TemplateError::invalid_spec(
            spec_text,
            "alternate form (#) not allowed in string format specifier",
        ));
    }
    if let Some(grouping) = spec.grouping {
        return Err(TemplateError::invalid_spec(
            spec_text,
            format!("cannot specify '{}' with 's'", grouping.separator()),
        ));
    }
    if spec.align == Some(Align::AfterSign) {
        return Err(TemplateError::invalid_spec(
            spec_text,
            "'=' alignment not allowed in string format specifier",
        ));
    }

    let text: String = match spec.precision {
        Some(p) => s.chars().take(p).collect(),
        None => s.to_string(),
    };
    let fill = spec
        .fill
        .unwrap_or(if spec.zero_pad { '0' } else { ' ' });
    Ok(pad(&text, spec.width, fill, spec.align.unwrap_or(Align::Left)))
}

fn format_int(i: i64, spec: &FormatSpec, spec_text: &str) -> TemplateResult<String> {
    let kind = spec.kind.unwrap_or('d');
    let (radix_digits, prefix, group_every) = match kind {
        'e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%' => {
            return format_float(i as f64, spec, spec_text);
        }
        'c' => return format_char(i, spec, spec_text),
        'd' | 'n' => (i.unsigned_abs().to_string(), "", 3),
        'b' => (format!("{:b}", i.unsigned_abs()), "0b", 4),
        'o' => (format!("{:o}", i.unsigned_abs()), "0o", 4),
        'x' => (format!("{:x}", i.unsigned_abs()), "0x", 4),
        'X' => (format!("{:X}", i.unsigned_abs()), "0X", 4),
        other => return Err(unknown_code(spec_text, other, "integer")),
    };

    if spec.precision.is_some() {
        return Err(TemplateError::invalid_spec(
            spec_text,
            "precision not allowed in integer format specifier",
        ));
    }
    if spec.grouping == Some(Grouping::Comma) && group_every == 4 {
        return Err(TemplateError::invalid_spec(
            spec_text,
            format!("cannot specify ',' with '{}'", kind),
        ));
    }

    let parts = NumberParts {
        sign: sign_str(i < 0, spec.sign),
        prefix: if spec.alternate { prefix } else { "" },
        int_digits: radix_digits,
        rest: String::new(),
        group_every,
    };
    Ok(parts.finish(spec))
}

fn format_char(i: i64, spec: &FormatSpec, spec_text: &str) -> TemplateResult<String> {
    if spec.precision.is_some()
        || spec.sign.is_some()
        || spec.alternate
        || spec.grouping.is_some()
    {
        return Err(TemplateError::invalid_spec(
            spec_text,
            "only fill, alignment, and width are allowed with format code 'c'",
        ));
    }
    let c = u32::try_from(i)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| {
            TemplateError::invalid_spec(spec_text, "%c arg not in range(0x110000)")
        })?;
    let fill = spec
        .fill
        .unwrap_or(if spec.zero_pad { '0' } else { ' ' });
    Ok(pad(
        &c.to_string(),
        spec.width,
        fill,
        spec.align.unwrap_or(Align::Right),
    ))
}

fn format_float(x: f64, spec: &FormatSpec, spec_text: &str) -> TemplateResult<String> {
    let negative = x.is_sign_negative() && !x.is_nan();
    let abs = x.abs();
    let precision = spec.precision.unwrap_or(DEFAULT_FLOAT_PRECISION);

    let body = match spec.kind {
        None => match spec.precision {
            None => float_repr(abs),
            Some(p) => general(abs, p, spec.alternate, true),
        },
        Some('f' | 'F') => fixed(abs, precision, spec.alternate),
        Some('%') => {
            let mut body = fixed(abs * 100.0, precision, spec.alternate);
            body.push('%');
            body
        }
        Some('e' | 'E') => scientific(abs, precision, spec.alternate),
        Some('g' | 'G' | 'n') => general(abs, precision, spec.alternate, false),
        Some(other) => return Err(unknown_code(spec_text, other, "float")),
    };
    let body = if matches!(spec.kind, Some('F' | 'E' | 'G')) {
        body.to_uppercase()
    } else {
        body
    };

    let split = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let parts = NumberParts {
        sign: sign_str(negative, spec.sign),
        prefix: "",
        int_digits: body[..split].to_string(),
        rest: body[split..].to_string(),
        group_every: 3,
    };
    Ok(parts.finish(spec))
}

/// Fixed-point notation.
fn fixed(abs: f64, precision: usize, alternate: bool) -> String {
    if !abs.is_finite() {
        return non_finite(abs);
    }
    let mut out = format!("{:.*}", precision, abs);
    if alternate && precision == 0 {
        out.push('.');
    }
    out
}

/// Scientific notation with a signed, two-digit exponent.
fn scientific(abs: f64, precision: usize, alternate: bool) -> String {
    if !abs.is_finite() {
        return non_finite(abs);
    }
    let (mut mantissa, exp) = split_exponent(&format!("{:.*e}", precision, abs));
    if alternate && precision == 0 {
        mantissa.push('.');
    }
    format!("{}{}", mantissa, format_exponent(exp))
}

/// General format: fixed or scientific depending on the exponent, with
/// insignificant trailing zeros removed unless `alternate` is set.
///
/// `repr_style` is used for a spec with a precision but no type: fixed
/// results always keep at least one digit after the point.
fn general(abs: f64, precision: usize, alternate: bool, repr_style: bool) -> String {
    if !abs.is_finite() {
        return non_finite(abs);
    }
    let p = precision.max(1);
    let exp = if abs == 0.0 {
        0
    } else {
        split_exponent(&format!("{:.*e}", p - 1, abs)).1
    };

    if (-4..p as i32).contains(&exp) {
        let mut out = format!("{:.*}", (p as i32 - 1 - exp) as usize, abs);
        if !alternate {
            strip_trailing_zeros(&mut out);
        }
        if repr_style && !out.contains('.') {
            out.push_str(".0");
        }
        out
    } else {
        let (mut mantissa, exp) = split_exponent(&format!("{:.*e}", p - 1, abs));
        if !alternate {
            strip_trailing_zeros(&mut mantissa);
        }
        format!("{}{}", mantissa, format_exponent(exp))
    }
}

fn non_finite(abs: f64) -> String {
    if abs.is_nan() { "nan" } else { "inf" }.to_string()
}

/// Split Rust's `{:e}` output ("1.25e3") into mantissa and exponent.
fn split_exponent(sci: &str) -> (String, i32) {
    match sci.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_string(), exp.parse().unwrap_or(0)),
        None => (sci.to_string(), 0),
    }
}

fn strip_trailing_zeros(s: &mut String) {
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
}

fn sign_str(negative: bool, sign: Option<Sign>) -> &'static str {
    match (negative, sign) {
        (true, _) => "-",
        (false, Some(Sign::Plus)) => "+",
        (false, Some(Sign::Space)) => " ",
        (false, _) => "",
    }
}

fn unknown_code(spec_text: &str, kind: char, type_name: &str) -> TemplateError {
    TemplateError::invalid_spec(
        spec_text,
        format!("unknown format code '{}' for {} value", kind, type_name),
    )
}

/// A formatted number before grouping and padding.
struct NumberParts {
    sign: &'static str,
    prefix: &'static str,
    /// Ungrouped digits of the integer part.
    int_digits: String,
    /// Everything after the integer part (fraction, exponent, `%`).
    rest: String,
    group_every: usize,
}

impl NumberParts {
    fn finish(self, spec: &FormatSpec) -> String {
        let fill = spec
            .fill
            .unwrap_or(if spec.zero_pad { '0' } else { ' ' });
        let align = spec.align.unwrap_or(if spec.zero_pad {
            Align::AfterSign
        } else {
            Align::Right
        });
        let head_len = self.sign.len() + self.prefix.len();

        let digits = match spec.grouping {
            Some(grouping) if fill == '0' && align == Align::AfterSign => {
                // Zero padding takes part in grouping: 1234 with `010,` is 00,001,234.
                let target = spec
                    .width
                    .unwrap_or(0)
                    .saturating_sub(head_len + self.rest.chars().count());
                let mut n = self.int_digits.len();
                while grouped_len(n, self.group_every) < target {
                    n += 1;
                }
                let mut raw: String = std::iter::repeat_n('0', n - self.int_digits.len()).collect();
                raw.push_str(&self.int_digits);
                group_digits(&raw, grouping.separator(), self.group_every)
            }
            Some(grouping) => {
                group_digits(&self.int_digits, grouping.separator(), self.group_every)
            }
            None => self.int_digits,
        };

        let body = format!("{}{}", digits, self.rest);
        let len = head_len + body.chars().count();
        let padding = spec.width.unwrap_or(0).saturating_sub(len);

        if align == Align::AfterSign {
            let fill_str: String = std::iter::repeat_n(fill, padding).collect();
            format!("{}{}{}{}", self.sign, self.prefix, fill_str, body)
        } else {
            let text = format!("{}{}{}", self.sign, self.prefix, body);
            pad(&text, spec.width, fill, align)
        }
    }
}

/// Length of `n` digits once grouped every `every` digits.
fn grouped_len(n: usize, every: usize) -> usize {
    if n == 0 { 0 } else { n + (n - 1) / every }
}

/// Insert `sep` every `every` digits, counting from the right.
fn group_digits(digits: &str, sep: char, every: usize) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / every);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % every == 0 {
            out.push(sep);
        }
        out.push(*c);
    }
    out
}

/// Pad `text` to `width` characters.
///
/// Centering puts the odd fill character on the right.
pub(crate) fn pad(text: &str, width: Option<usize>, fill: char, align: Align) -> String {
    let len = text.chars().count();
    let padding = width.unwrap_or(0).saturating_sub(len);
    if padding == 0 {
        return text.to_string();
    }
    let repeat = |n: usize| -> String { std::iter::repeat_n(fill, n).collect() };
    match align {
        Align::Left => format!("{}{}", text, repeat(padding)),
        Align::Right | Align::AfterSign => format!("{}{}", repeat(padding), text),
        Align::Center => {
            let left = padding / 2;
            format!("{}{}{}", repeat(left), text, repeat(padding - left))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fmt(value: impl Into<Value>, spec: &str) -> String {
        format_value(&value.into(), spec).expect("format should succeed")
    }

    fn fmt_err(value: impl Into<Value>, spec: &str) -> String {
        match format_value(&value.into(), spec) {
            Err(TemplateError::InvalidFormatSpec { message, .. }) => message,
            other => panic!("expected InvalidFormatSpec, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_spec_is_display_form() {
        assert_eq!(fmt("hi", ""), "hi");
        assert_eq!(fmt(42, ""), "42");
        assert_eq!(fmt(3.5, ""), "3.5");
        assert_eq!(fmt(true, ""), "True");
        assert_eq!(format_value(&Value::None, "").unwrap(), "None");
    }

    #[test]
    fn test_string_alignment() {
        assert_eq!(fmt("left", "*<10"), "left******");
        assert_eq!(fmt("right", "*>10"), "*****right");
        assert_eq!(fmt("center", "*^10"), "**center**");
        assert_eq!(fmt("odd", "^6"), " odd  ");
        assert_eq!(fmt("abc", "2"), "abc");
    }

    #[test]
    fn test_string_precision_truncates_chars() {
        assert_eq!(fmt("héllo wörld", ".5"), "héllo");
        assert_eq!(fmt("abc", "5.2s"), "ab   ");
    }

    #[test]
    fn test_string_zero_pad() {
        assert_eq!(fmt("ab", "05"), "ab000");
    }

    #[test]
    fn test_string_rejects_numeric_options() {
        assert_eq!(fmt_err("x", "d"), "unknown format code 'd' for string value");
        assert_eq!(fmt_err("x", "+"), "sign not allowed in string format specifier");
        assert_eq!(fmt_err("x", ","), "cannot specify ',' with 's'");
        assert_eq!(
            fmt_err("x", "=5"),
            "'=' alignment not allowed in string format specifier"
        );
    }

    #[test]
    fn test_integer_padding_and_sign() {
        assert_eq!(fmt(42, "05d"), "00042");
        assert_eq!(fmt(42, "5d"), "   42");
        assert_eq!(fmt(-42, "05d"), "-0042");
        assert_eq!(fmt(42, "+d"), "+42");
        assert_eq!(fmt(-42, "+d"), "-42");
        assert_eq!(fmt(42, " d"), " 42");
        assert_eq!(fmt(-42, "=+8"), "-     42");
        assert_eq!(fmt(42, "<5"), "42   ");
        assert_eq!(fmt(42, "^6"), "  42  ");
    }

    #[test]
    fn test_integer_grouping() {
        assert_eq!(fmt(1234567, ","), "1,234,567");
        assert_eq!(fmt(1234567, "_"), "1_234_567");
        assert_eq!(fmt(-1234, ",d"), "-1,234");
        assert_eq!(fmt(123, ","), "123");
        assert_eq!(fmt(1234, "010,"), "00,001,234");
        assert_eq!(fmt(1234, "09,"), "0,001,234");
    }

    #[test]
    fn test_wide_zero_padded_grouping() {
        let out = fmt(1234, "020000,");
        assert_eq!(out.len(), 20001);
        assert!(out.starts_with("0,000,"));
        assert!(out.ends_with("001,234"));
        assert_eq!(fmt(-5, "08_"), "-000_005");
    }

    #[test]
    fn test_huge_precision_rejected() {
        assert!(matches!(
            format_value(&Value::Float(1.5), ".9999999999f"),
            Err(TemplateError::InvalidFormatSpec { .. })
        ));
    }

    #[test]
    fn test_integer_radixes() {
        assert_eq!(fmt(42, "x"), "2a");
        assert_eq!(fmt(42, "X"), "2A");
        assert_eq!(fmt(42, "b"), "101010");
        assert_eq!(fmt(8, "o"), "10");
        assert_eq!(fmt(42, "#x"), "0x2a");
        assert_eq!(fmt(42, "#X"), "0X2A");
        assert_eq!(fmt(5, "#b"), "0b101");
        assert_eq!(fmt(-255, "#x"), "-0xff");
        assert_eq!(fmt(255, "#010x"), "0x000000ff");
        assert_eq!(fmt(0xdeadbeef_u32, "_x"), "dead_beef");
    }

    #[test]
    fn test_integer_char() {
        assert_eq!(fmt(65, "c"), "A");
        assert_eq!(fmt(0x3c0, ">3c"), "  π");
        assert_eq!(fmt_err(-1, "c"), "%c arg not in range(0x110000)");
    }

    #[test]
    fn test_integer_as_float() {
        assert_eq!(fmt(3, ".2f"), "3.00");
        assert_eq!(fmt(1, "%"), "100.000000%");
    }

    #[test]
    fn test_integer_rejections() {
        assert_eq!(fmt_err(42, "s"), "unknown format code 's' for integer value");
        assert_eq!(
            fmt_err(42, ".2d"),
            "precision not allowed in integer format specifier"
        );
        assert_eq!(fmt_err(42, ",x"), "cannot specify ',' with 'x'");
    }

    #[test]
    fn test_bool_under_numeric_spec() {
        assert_eq!(fmt(true, "d"), "1");
        assert_eq!(fmt(false, ">3"), "  0");
    }

    #[test]
    fn test_float_fixed() {
        assert_eq!(fmt(3.14159, ".2f"), "3.14");
        assert_eq!(fmt(2.7, ".0f"), "3");
        assert_eq!(fmt(2.0, "#.0f"), "2.");
        assert_eq!(fmt(3.14159, "f"), "3.141590");
        assert_eq!(fmt(-3.14159, "+.1f"), "-3.1");
        assert_eq!(fmt(3.14159, "+.1f"), "+3.1");
        assert_eq!(fmt(1234567.891, ",.2f"), "1,234,567.89");
        assert_eq!(fmt(3.14159, "08.2f"), "00003.14");
        assert_eq!(fmt(19.5, ">8.2f"), "   19.50");
    }

    #[test]
    fn test_float_percent() {
        assert_eq!(fmt(0.1234, ".2%"), "12.34%");
        assert_eq!(fmt(0.5, ".0%"), "50%");
    }

    #[test]
    fn test_float_scientific() {
        assert_eq!(fmt(12345.678, ".2e"), "1.23e+04");
        assert_eq!(fmt(0.00012, "E"), "1.200000E-04");
        assert_eq!(fmt(0.0, "e"), "0.000000e+00");
    }

    #[test]
    fn test_float_general() {
        assert_eq!(fmt(1234.5678, "g"), "1234.57");
        assert_eq!(fmt(0.00001234, "g"), "1.234e-05");
        assert_eq!(fmt(1e20, "g"), "1e+20");
        assert_eq!(fmt(100.0, "g"), "100");
        assert_eq!(fmt(100.0, "#g"), "100.000");
        assert_eq!(fmt(1e20, "G"), "1E+20");
    }

    #[test]
    fn test_float_precision_without_type() {
        assert_eq!(fmt(1.0, ".3"), "1.0");
        assert_eq!(fmt(1234.0, ".2"), "1.2e+03");
        assert_eq!(fmt(3.14159, ".3"), "3.14");
    }

    #[test]
    fn test_float_non_finite() {
        assert_eq!(fmt(f64::INFINITY, "f"), "inf");
        assert_eq!(fmt(f64::NEG_INFINITY, ">6"), "  -inf");
        assert_eq!(fmt(f64::NAN, "F"), "NAN");
    }

    #[test]
    fn test_float_rejects_integer_codes() {
        assert_eq!(fmt_err(3.5, "d"), "unknown format code 'd' for float value");
        assert_eq!(fmt_err(3.5, "x"), "unknown format code 'x' for float value");
    }

    #[test]
    fn test_containers_reject_specs() {
        assert_eq!(
            fmt_err(vec![1, 2], ">5"),
            "unsupported format string passed to list value"
        );
        assert_eq!(
            format_value(&Value::from(vec![1, 2]), "").unwrap(),
            "[1, 2]"
        );
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("1234567", ',', 3), "1,234,567");
        assert_eq!(group_digits("123", ',', 3), "123");
        assert_eq!(group_digits("", ',', 3), "");
        assert_eq!(group_digits("11111111", '_', 4), "1111_1111");
    }
}
