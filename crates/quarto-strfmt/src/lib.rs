/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Extensible string templates.
//!
//! This crate implements brace-style templates with a field mini-language
//! for width, alignment, precision and numeric presentation, plus the
//! simpler dollar-style templates. It supports:
//!
//! - Positional and named fields: `{0}`, `{name}`, automatic numbering `{}`
//! - Field access: `{user.name}`, `{items[0]}`, `{config[key]}`
//! - Conversions: `{x!r}`, `{x!s}`, `{x!a}`, plus registered custom tags
//! - The format-spec mini-language: `{x:*^10}`, `{n:+,.2f}`, `{n:#010x}`
//! - Fields nested inside specs: `{x:{width}.{precision}}`
//! - Custom format hooks keyed by spec token or by value kind
//! - Strict and safe substitution, and unused-binding checks
//! - Dollar templates: `$name`, `${name}`, `$$`
//!
//! # Architecture
//!
//! A source string is parsed once into a [`Template`], an immutable list of
//! literal and placeholder segments. A [`Formatter`] renders it against
//! [`Args`]: each placeholder is resolved, optionally converted, then
//! formatted. Formatters are configured through [`FormatterBuilder`] and
//! cannot be changed afterwards, so they can be shared across threads.
//!
//! # Example
//!
//! ```ignore
//! use quarto_strfmt::{Args, Formatter, Template};
//!
//! let template = Template::parse("Hello, {name}! You have {count:>3d} messages.")?;
//! let args = Args::new().with_named("name", "Alice").with_named("count", 7);
//! assert_eq!(template.substitute(&args)?, "Hello, Alice! You have   7 messages.");
//!
//! let formatter = Formatter::builder()
//!     .with_conversion('u', |v| v.to_string().to_uppercase())
//!     .build();
//! assert_eq!(formatter.format("{0!u}", &Args::positional(["shout"]))?, "SHOUT");
//! ```

pub mod ast;
pub mod constants;
pub mod convert;
pub mod dollar;
pub mod error;
pub mod format;
pub mod formatter;
pub mod helpers;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod spec;
pub mod value;

// Re-export main types at crate root
pub use ast::{Accessor, FieldKey, Literal, Placeholder, Segment};
pub use convert::convert_value;
pub use dollar::DollarTemplate;
pub use error::{TemplateError, TemplateResult};
pub use format::format_value;
pub use formatter::{
    Formatter, FormatterBuilder, FormatterOptions, Rendered, UnusedBindings, check_unused,
};
pub use helpers::capwords;
pub use parser::{DEFAULT_MAX_SPEC_DEPTH, Template};
pub use registry::{ConversionHook, FormatHook, HookRegistry};
pub use resolver::{MissingKeyPolicy, Resolution, UsedKeys, resolve};
pub use spec::{Align, FormatSpec, Grouping, Sign};
pub use value::{Args, Value, ValueKind};
