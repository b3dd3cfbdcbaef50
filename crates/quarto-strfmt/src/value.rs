/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template values and bindings.
//!
//! This module defines the values that can be bound to placeholders and the
//! [`Args`] container that carries positional and named bindings into a
//! substitution call.
//!
//! Values have two textual forms:
//!
//! - the *display* form (`Display` impl), used by the `!s` conversion and
//!   by the empty format spec;
//! - the *representation* form ([`Value::repr`]), used by `!r` and `!a`,
//!   which quotes and escapes strings.

use indexmap::IndexMap;
use std::fmt;

/// A value that can be substituted into a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value.
    Str(String),

    /// A signed integer.
    Int(i64),

    /// A floating-point number.
    Float(f64),

    /// A boolean value.
    Bool(bool),

    /// A list of values, addressable with `[index]`.
    List(Vec<Value>),

    /// A map of string keys to values, addressable with `.name` or `[key]`.
    Map(IndexMap<String, Value>),

    /// The absent value.
    None,
}

/// The type of a [`Value`], used to key per-type format hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Str,
    Int,
    Float,
    Bool,
    List,
    Map,
    None,
}

impl ValueKind {
    /// Human-readable type name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Str => "string",
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::Bool => "boolean",
            ValueKind::List => "list",
            ValueKind::Map => "map",
            ValueKind::None => "none",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Str(_) => ValueKind::Str,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::None => ValueKind::None,
        }
    }

    /// Look up `.name` on a map value.
    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(name),
            _ => None,
        }
    }

    /// Look up `[index]` on a list value.
    ///
    /// On a map the index is treated as a string key, so `{0[1]}` works for
    /// maps keyed by digits.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::List(items) => items.get(index),
            Value::Map(m) => m.get(index.to_string().as_str()),
            _ => None,
        }
    }

    /// Look up `[key]` on a map value.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// Render the representation form: strings are quoted and escaped,
    /// containers show their elements' representation forms.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => quote_str(s),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::repr).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Map(m) => {
                let inner: Vec<String> = m
                    .iter()
                    .map(|(k, v)| format!("{}: {}", quote_str(k), v.repr()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
            other => other.to_string(),
        }
    }

    /// Like [`Value::repr`], with every non-ASCII character escaped.
    pub fn ascii(&self) -> String {
        escape_non_ascii(&self.repr())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&float_repr(*x)),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::None => f.write_str("None"),
            Value::List(_) | Value::Map(_) => f.write_str(&self.repr()),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Value::Int(i64::from(i))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

/// Positional and named bindings for one substitution call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    named: IndexMap<String, Value>,
}

impl Args {
    /// Create an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create bindings from positional values only.
    pub fn positional<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            named: IndexMap::new(),
        }
    }

    /// Create bindings from named values only.
    pub fn named<K: Into<String>, V: Into<Value>>(
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            positional: Vec::new(),
            named: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a positional value (builder style).
    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.push(value);
        self
    }

    /// Bind a named value (builder style).
    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Append a positional value.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.positional.push(value.into());
    }

    /// Bind a named value, replacing any previous binding for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.named.insert(key.into(), value.into());
    }

    /// Merge another set of bindings into this one.
    ///
    /// Positional values are appended; named values from `other` win.
    pub fn extend(&mut self, other: Args) {
        self.positional.extend(other.positional);
        self.named.extend(other.named);
    }

    /// Get a positional value by zero-based index.
    pub fn get_positional(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Get a named value by exact key.
    pub fn get_named(&self, key: &str) -> Option<&Value> {
        self.named.get(key)
    }

    pub fn positional_values(&self) -> &[Value] {
        &self.positional
    }

    pub fn named_values(&self) -> &IndexMap<String, Value> {
        &self.named
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Build bindings from JSON.
    ///
    /// An object becomes named bindings, an array becomes positional
    /// bindings, and any other value becomes a single positional binding.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(obj) => {
                Self::named(obj.iter().map(|(k, v)| (k.clone(), Value::from(v))))
            }
            serde_json::Value::Array(items) => Self::positional(items.iter().map(Value::from)),
            other => Self::positional([Value::from(other)]),
        }
    }
}

/// Render a float in shortest round-trip form.
///
/// Integral values keep a trailing `.0`; magnitudes below `1e-4` or at least
/// `1e16` switch to exponent notation with a signed, two-digit exponent.
pub(crate) fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    // `{:e}` yields the shortest round-trip digits, e.g. "-1.2345e3".
    let sci = format!("{:e}", x);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let negative = mantissa.starts_with('-');
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    let mut out = String::new();
    if negative {
        out.push('-');
    }

    if (-4..16).contains(&exp) {
        if exp >= 0 {
            let point = (exp + 1) as usize;
            if digits.len() > point {
                out.push_str(&digits[..point]);
                out.push('.');
                out.push_str(&digits[point..]);
            } else {
                out.push_str(&digits);
                out.push_str(&"0".repeat(point - digits.len()));
                out.push_str(".0");
            }
        } else {
            out.push_str("0.");
            out.push_str(&"0".repeat((-exp - 1) as usize));
            out.push_str(&digits);
        }
    } else {
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push_str(&format_exponent(exp));
    }
    out
}

/// Format an exponent as `e+NN` / `e-NN` (at least two digits).
pub(crate) fn format_exponent(exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("e{}{:02}", sign, exp.unsigned_abs())
}

fn quote_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if !is_printable(c) => out.push_str(&escape_char(c)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn is_printable(c: char) -> bool {
    c == ' ' || !(c.is_control() || c.is_whitespace() || is_format_or_private(c))
}

/// Format characters (zero-width and bidi controls, BOM, tags, ...) and
/// private-use code points. Unassigned code points are not detected.
fn is_format_or_private(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
    )
}

fn escape_char(c: char) -> String {
    let code = c as u32;
    if code < 0x100 {
        format!("\\x{:02x}", code)
    } else if code < 0x10000 {
        format!("\\u{:04x}", code)
    } else {
        format!("\\U{:08x}", code)
    }
}

fn escape_non_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&escape_char(c));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(true).to_string(), "True");
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from("a")]).to_string(),
            "[1, 'a']"
        );
    }

    #[test]
    fn test_float_repr() {
        assert_eq!(float_repr(3.14159), "3.14159");
        assert_eq!(float_repr(1.0), "1.0");
        assert_eq!(float_repr(-2.5), "-2.5");
        assert_eq!(float_repr(0.1), "0.1");
        assert_eq!(float_repr(0.0001), "0.0001");
        assert_eq!(float_repr(0.00001), "1e-05");
        assert_eq!(float_repr(1.5e-7), "1.5e-07");
        assert_eq!(float_repr(1e16), "1e+16");
        assert_eq!(float_repr(123456789.0), "123456789.0");
        assert_eq!(float_repr(-0.0), "-0.0");
        assert_eq!(float_repr(f64::INFINITY), "inf");
        assert_eq!(float_repr(f64::NAN), "nan");
    }

    #[test]
    fn test_repr_quotes_and_escapes() {
        assert_eq!(Value::from("hi\n").repr(), "'hi\\n'");
        assert_eq!(Value::from("it's").repr(), "\"it's\"");
        assert_eq!(Value::from("both ' and \"").repr(), "'both \\' and \"'");
        assert_eq!(Value::from("tab\there").repr(), "'tab\\there'");
        assert_eq!(Value::from("bell\u{7}").repr(), "'bell\\x07'");
        assert_eq!(Value::from("café").repr(), "'café'");
        assert_eq!(Value::from("a\u{200B}b").repr(), "'a\\u200bb'");
        assert_eq!(Value::from("\u{FEFF}x").repr(), "'\\ufeffx'");
        assert_eq!(Value::from("\u{E000}").repr(), "'\\ue000'");
    }

    #[test]
    fn test_ascii_escapes_non_ascii() {
        assert_eq!(Value::from("café").ascii(), "'caf\\xe9'");
        assert_eq!(Value::from("π").ascii(), "'\\u03c0'");
        assert_eq!(Value::from("🎉").ascii(), "'\\U0001f389'");
    }

    #[test]
    fn test_map_repr_keeps_insertion_order() {
        let mut m = IndexMap::new();
        m.insert("b".to_string(), Value::from(2));
        m.insert("a".to_string(), Value::from("x"));
        assert_eq!(Value::Map(m).repr(), "{'b': 2, 'a': 'x'}");
    }

    #[test]
    fn test_accessors() {
        let mut m = IndexMap::new();
        m.insert("name".to_string(), Value::from("Bob"));
        m.insert("1".to_string(), Value::from("one"));
        let map = Value::Map(m);
        let list = Value::from(vec![3, 5]);

        assert_eq!(map.get_attr("name"), Some(&Value::from("Bob")));
        assert_eq!(map.get_key("name"), Some(&Value::from("Bob")));
        assert_eq!(map.get_index(1), Some(&Value::from("one")));
        assert_eq!(list.get_index(1), Some(&Value::from(5)));
        assert_eq!(list.get_index(2), None);
        assert_eq!(list.get_attr("name"), None);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"name": "Ada", "age": 36, "ratio": 0.5, "tags": ["a"], "x": null});
        let args = Args::from_json(&json);
        assert_eq!(args.get_named("name"), Some(&Value::from("Ada")));
        assert_eq!(args.get_named("age"), Some(&Value::Int(36)));
        assert_eq!(args.get_named("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(args.get_named("tags"), Some(&Value::from(vec!["a"])));
        assert_eq!(args.get_named("x"), Some(&Value::None));

        let positional = Args::from_json(&serde_json::json!(["a", 1]));
        assert_eq!(positional.positional_values(), &[Value::from("a"), Value::from(1)]);
    }

    #[test]
    fn test_args_builder_and_extend() {
        let mut args = Args::new().with_arg("a").with_named("x", 1);
        args.extend(Args::new().with_arg("b").with_named("x", 2));
        assert_eq!(args.get_positional(1), Some(&Value::from("b")));
        assert_eq!(args.get_named("x"), Some(&Value::from(2)));
        assert!(!args.is_empty());
        assert!(Args::new().is_empty());
    }
}
