/*
 * formatter.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Substitution orchestrator.
//!
//! Drives parse → resolve → convert → format → concatenate for brace
//! templates and exposes the two substitution modes:
//!
//! - [`Formatter::substitute`]: strict; the first error aborts and no
//!   partial output is returned.
//! - [`Formatter::safe_substitute`]: missing keys leave the placeholder's
//!   original text in place. Malformed templates, unknown conversions and
//!   invalid format specs are still errors, whether or not the key is bound.
//!
//! A formatter built with [`FormatterBuilder::with_missing_value`] fills
//! missing keys with that value during strict substitution instead.
//!
//! A [`Formatter`] is configured once through [`FormatterBuilder`] and is
//! immutable afterwards, so one instance can serve any number of threads.

use crate::ast::{Placeholder, Segment};
use crate::convert::{check_conversion, convert_value};
use crate::error::{TemplateError, TemplateResult};
use crate::parser::{DEFAULT_MAX_SPEC_DEPTH, Template};
use crate::registry::HookRegistry;
use crate::resolver::{MissingKeyPolicy, Resolution, UsedKeys, resolve};
use crate::value::{Args, Value, ValueKind};
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::Arc;

/// Formatter settings.
///
/// Deserializable so callers can keep them in a JSON settings file:
///
/// ```json
/// { "max-spec-depth": 1, "reject-unused": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FormatterOptions {
    /// How deeply fields may nest inside format specs.
    pub max_spec_depth: usize,

    /// Make [`Formatter::substitute`] fail when bindings go unused.
    pub reject_unused: bool,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            max_spec_depth: DEFAULT_MAX_SPEC_DEPTH,
            reject_unused: false,
        }
    }
}

impl FormatterOptions {
    /// Load options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Output of [`Formatter::render`]: the text plus the keys it consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub output: String,
    pub used: UsedKeys,
}

/// Bindings that a substitution never referenced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnusedBindings {
    pub positional: Vec<usize>,
    pub named: Vec<String>,
}

impl UnusedBindings {
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Turn a non-empty report into [`TemplateError::UnusedBindings`].
    pub fn into_result(self) -> TemplateResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(TemplateError::UnusedBindings {
                positional: self.positional,
                named: self.named,
            })
        }
    }
}

/// Report the bindings in `args` that are absent from `used`.
pub fn check_unused(args: &Args, used: &UsedKeys) -> UnusedBindings {
    UnusedBindings {
        positional: (0..args.positional_values().len())
            .filter(|&i| !used.contains_index(i))
            .collect(),
        named: args
            .named_values()
            .keys()
            .filter(|name| !used.contains_name(name))
            .cloned()
            .collect(),
    }
}

/// Brace-template formatter with optional custom hooks.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    hooks: Arc<HookRegistry>,
    options: FormatterOptions,
    missing_value: Option<Value>,
}

impl Formatter {
    /// A formatter with only the built-in conversions and format specs.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> FormatterBuilder {
        FormatterBuilder::default()
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    /// Value used in place of missing keys by strict substitution, if any.
    pub fn missing_value(&self) -> Option<&Value> {
        self.missing_value.as_ref()
    }

    /// Parse a template using this formatter's nesting limit.
    pub fn parse(&self, source: &str) -> TemplateResult<Template> {
        Template::parse_with_max_depth(source, self.options.max_spec_depth)
    }

    /// Substitute and report which keys were consulted.
    pub fn render(
        &self,
        template: &Template,
        args: &Args,
        policy: MissingKeyPolicy,
    ) -> TemplateResult<Rendered> {
        tracing::debug!(
            policy = ?policy,
            segments = template.segments.len(),
            "Substituting template"
        );
        let mut used = UsedKeys::new();
        let mut output = String::with_capacity(template.source.len());

        for segment in &template.segments {
            match segment {
                Segment::Literal(literal) => output.push_str(&literal.text),
                Segment::Placeholder(placeholder) => {
                    match self.render_field(placeholder, args, &policy, &mut used)? {
                        Some(text) => output.push_str(&text),
                        None => output.push_str(&placeholder.source),
                    }
                }
            }
        }

        Ok(Rendered { output, used })
    }

    /// Strict substitution.
    pub fn substitute(&self, template: &Template, args: &Args) -> TemplateResult<String> {
        if self.options.reject_unused {
            return self.substitute_checked(template, args);
        }
        Ok(self.render(template, args, self.strict_policy())?.output)
    }

    /// Safe substitution: missing keys are left as their placeholder text.
    pub fn safe_substitute(&self, template: &Template, args: &Args) -> TemplateResult<String> {
        Ok(self
            .render(template, args, MissingKeyPolicy::LeaveLiteral)?
            .output)
    }

    /// Strict substitution that also fails when any binding goes unused.
    pub fn substitute_checked(&self, template: &Template, args: &Args) -> TemplateResult<String> {
        let rendered = self.render(template, args, self.strict_policy())?;
        check_unused(args, &rendered.used).into_result()?;
        Ok(rendered.output)
    }

    /// Parse `source` and substitute it strictly.
    pub fn format(&self, source: &str, args: &Args) -> TemplateResult<String> {
        self.substitute(&self.parse(source)?, args)
    }

    /// Parse `source` and substitute it safely.
    pub fn safe_format(&self, source: &str, args: &Args) -> TemplateResult<String> {
        self.safe_substitute(&self.parse(source)?, args)
    }

    fn strict_policy(&self) -> MissingKeyPolicy {
        match &self.missing_value {
            Some(value) => MissingKeyPolicy::Default(value.clone()),
            None => MissingKeyPolicy::Error,
        }
    }

    /// Render one placeholder. `None` means "leave it as written".
    fn render_field(
        &self,
        placeholder: &Placeholder,
        args: &Args,
        policy: &MissingKeyPolicy,
        used: &mut UsedKeys,
    ) -> TemplateResult<Option<String>> {
        let value = match resolve(
            &placeholder.key,
            &placeholder.accessors,
            args,
            policy,
            used,
        )? {
            Resolution::Found(value) => value,
            Resolution::LeaveLiteral => return self.leave_literal(placeholder),
        };

        // Nested fields in the spec are resolved before the outer field
        // is formatted.
        let spec: Cow<'_, str> = match &placeholder.spec_segments {
            Some(segments) => match self.render_nested(segments, args, policy, used)? {
                Some(spec) => Cow::Owned(spec),
                None => return self.leave_literal(placeholder),
            },
            None => Cow::Borrowed(placeholder.format_spec.as_str()),
        };

        let converted = convert_value(value, placeholder.conversion, &self.hooks)?;
        let text = self.hooks.format_field(&converted, &spec)?;
        tracing::trace!(field = %placeholder.field_path(), spec = %spec, "Formatted field");
        Ok(Some(text))
    }

    /// Keep a placeholder as written, after checking the parts of it that
    /// do not depend on a value.
    fn leave_literal(&self, placeholder: &Placeholder) -> TemplateResult<Option<String>> {
        check_conversion(placeholder.conversion, &self.hooks)?;
        if placeholder.spec_segments.is_none() {
            self.hooks.check_spec(&placeholder.format_spec)?;
        }
        Ok(None)
    }

    fn render_nested(
        &self,
        segments: &[Segment],
        args: &Args,
        policy: &MissingKeyPolicy,
        used: &mut UsedKeys,
    ) -> TemplateResult<Option<String>> {
        let mut out = String::new();
        for segment in segments {
            match segment {
                Segment::Literal(literal) => out.push_str(&literal.text),
                Segment::Placeholder(placeholder) => {
                    match self.render_field(placeholder, args, policy, used)? {
                        Some(text) => out.push_str(&text),
                        None => return Ok(None),
                    }
                }
            }
        }
        Ok(Some(out))
    }
}

/// Builder for [`Formatter`].
///
/// Hooks can only be registered here; once built, a formatter's hooks
/// never change.
#[derive(Debug, Default)]
pub struct FormatterBuilder {
    hooks: HookRegistry,
    options: FormatterOptions,
    missing_value: Option<Value>,
}

impl FormatterBuilder {
    /// Register a custom `!tag` conversion.
    pub fn with_conversion(
        mut self,
        tag: char,
        hook: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> Self {
        self.hooks.add_conversion(tag, hook);
        self
    }

    /// Register a formatter for fields whose whole spec equals `token`.
    pub fn with_spec_token(
        mut self,
        token: impl Into<String>,
        hook: impl Fn(&Value, &str) -> TemplateResult<String> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.add_spec_token(token, hook);
        self
    }

    /// Register a formatter for every value of `kind`.
    pub fn with_value_kind(
        mut self,
        kind: ValueKind,
        hook: impl Fn(&Value, &str) -> TemplateResult<String> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.add_value_kind(kind, hook);
        self
    }

    /// Replace the hook registry wholesale.
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_options(mut self, options: FormatterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_spec_depth(mut self, depth: usize) -> Self {
        self.options.max_spec_depth = depth;
        self
    }

    pub fn with_reject_unused(mut self, reject: bool) -> Self {
        self.options.reject_unused = reject;
        self
    }

    /// Fill missing keys with `value` during strict substitution.
    ///
    /// The value is converted and formatted like a bound one. Safe
    /// substitution still leaves missing placeholders as written.
    pub fn with_missing_value(mut self, value: impl Into<Value>) -> Self {
        self.missing_value = Some(value.into());
        self
    }

    pub fn build(self) -> Formatter {
        Formatter {
            hooks: Arc::new(self.hooks),
            options: self.options,
            missing_value: self.missing_value,
        }
    }
}

impl Template {
    /// Strict substitution with the built-in formatter.
    pub fn substitute(&self, args: &Args) -> TemplateResult<String> {
        Formatter::new().substitute(self, args)
    }

    /// Safe substitution with the built-in formatter.
    pub fn safe_substitute(&self, args: &Args) -> TemplateResult<String> {
        Formatter::new().safe_substitute(self, args)
    }
}
