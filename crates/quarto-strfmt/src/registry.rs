/*
 * registry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Conversion and format hooks.
//!
//! Custom behavior is injected through a [`HookRegistry`] that is filled in
//! once, handed to a [`crate::Formatter`] at construction time, and then
//! only read. Hooks are looked up by:
//!
//! - conversion tag (`{x!u}` → the hook registered for `'u'`),
//! - whole format spec token (`{x:capitalize}` → the hook registered for
//!   `"capitalize"`),
//! - value kind (every float, every boolean, ...).
//!
//! Registered hooks take precedence over the built-in behavior.

use crate::error::TemplateResult;
use crate::format::format_value;
use crate::spec::FormatSpec;
use crate::value::{Value, ValueKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A custom `!x` conversion.
///
/// Implemented for any `Fn(&Value) -> String + Send + Sync`.
pub trait ConversionHook: Send + Sync {
    /// Convert a resolved value to text.
    fn convert(&self, value: &Value) -> String;
}

impl<F> ConversionHook for F
where
    F: Fn(&Value) -> String + Send + Sync,
{
    fn convert(&self, value: &Value) -> String {
        self(value)
    }
}

/// A custom field formatter.
///
/// Implemented for any `Fn(&Value, &str) -> TemplateResult<String> + Send + Sync`.
/// The second argument is the raw format spec.
pub trait FormatHook: Send + Sync {
    fn format(&self, value: &Value, spec: &str) -> TemplateResult<String>;
}

impl<F> FormatHook for F
where
    F: Fn(&Value, &str) -> TemplateResult<String> + Send + Sync,
{
    fn format(&self, value: &Value, spec: &str) -> TemplateResult<String> {
        self(value, spec)
    }
}

/// Registry of conversion and format hooks.
#[derive(Clone, Default)]
pub struct HookRegistry {
    conversions: HashMap<char, Arc<dyn ConversionHook>>,
    spec_tokens: HashMap<String, Arc<dyn FormatHook>>,
    value_kinds: HashMap<ValueKind, Arc<dyn FormatHook>>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a conversion hook object for `{field!tag}`.
    pub fn add_conversion_hook(&mut self, tag: char, hook: Arc<dyn ConversionHook>) -> &mut Self {
        self.conversions.insert(tag, hook);
        self
    }

    /// Register a format hook object for fields whose whole spec equals `token`.
    pub fn add_spec_token_hook(
        &mut self,
        token: impl Into<String>,
        hook: Arc<dyn FormatHook>,
    ) -> &mut Self {
        self.spec_tokens.insert(token.into(), hook);
        self
    }

    /// Register a conversion for `{field!tag}`.
    ///
    /// Registering a built-in tag (`s`, `r`, `a`) overrides it.
    pub fn add_conversion(
        &mut self,
        tag: char,
        hook: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> &mut Self {
        self.conversions.insert(tag, Arc::new(hook));
        self
    }

    /// Register a formatter for fields whose whole spec equals `token`.
    pub fn add_spec_token(
        &mut self,
        token: impl Into<String>,
        hook: impl Fn(&Value, &str) -> TemplateResult<String> + Send + Sync + 'static,
    ) -> &mut Self {
        self.spec_tokens.insert(token.into(), Arc::new(hook));
        self
    }

    /// Register a formatter for every value of `kind`.
    pub fn add_value_kind(
        &mut self,
        kind: ValueKind,
        hook: impl Fn(&Value, &str) -> TemplateResult<String> + Send + Sync + 'static,
    ) -> &mut Self {
        self.value_kinds.insert(kind, Arc::new(hook));
        self
    }

    /// Look up a registered conversion.
    pub fn conversion(&self, tag: char) -> Option<&dyn ConversionHook> {
        self.conversions.get(&tag).map(|hook| hook.as_ref())
    }

    /// Format a value, consulting spec-token hooks, then value-kind hooks,
    /// then the built-in mini-language.
    pub fn format_field(&self, value: &Value, spec: &str) -> TemplateResult<String> {
        if let Some(hook) = self.spec_tokens.get(spec) {
            tracing::trace!(spec, "Using spec-token format hook");
            return hook.format(value, spec);
        }
        if let Some(hook) = self.value_kinds.get(&value.kind()) {
            tracing::trace!(kind = %value.kind(), "Using value-kind format hook");
            return hook.format(value, spec);
        }
        format_value(value, spec)
    }

    /// Check a spec without a value to format.
    ///
    /// Spec-token hooks accept their token, and value-kind hooks may accept
    /// anything, so only the built-in grammar is checked, and only when
    /// neither applies.
    pub fn check_spec(&self, spec: &str) -> TemplateResult<()> {
        if spec.is_empty() || self.spec_tokens.contains_key(spec) || !self.value_kinds.is_empty() {
            return Ok(());
        }
        FormatSpec::parse(spec).map(|_| ())
    }

    /// True when no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.conversions.is_empty() && self.spec_tokens.is_empty() && self.value_kinds.is_empty()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut conversions: Vec<_> = self.conversions.keys().collect();
        conversions.sort();
        let mut spec_tokens: Vec<_> = self.spec_tokens.keys().collect();
        spec_tokens.sort();
        let value_kinds: Vec<_> = self.value_kinds.keys().collect();
        f.debug_struct("HookRegistry")
            .field("conversions", &conversions)
            .field("spec_tokens", &spec_tokens)
            .field("value_kinds", &value_kinds)
            .finish()
    }
}
