/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Value resolution.
//!
//! Looks up a placeholder's key in the supplied [`Args`] and follows its
//! accessor chain. Integer keys are positional, string keys are named.
//! What happens when a lookup fails depends on the [`MissingKeyPolicy`].

use crate::ast::{Accessor, FieldKey};
use crate::error::{TemplateError, TemplateResult};
use crate::value::{Args, Value};
use std::collections::BTreeSet;

/// What to do when a key (or accessor step) cannot be resolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MissingKeyPolicy {
    /// Fail with [`TemplateError::MissingKey`] (strict substitution).
    #[default]
    Error,
    /// Leave the placeholder in the output as literal text (safe substitution).
    LeaveLiteral,
    /// Substitute this value instead. It goes through conversion and
    /// formatting like a bound value.
    Default(Value),
}

/// Outcome of resolving a placeholder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// The bound value.
    Found(&'a Value),
    /// The key is missing and the policy says to keep the placeholder text.
    LeaveLiteral,
}

/// The set of top-level keys consulted during a substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedKeys {
    keys: BTreeSet<FieldKey>,
}

impl UsedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey) {
        self.keys.insert(key);
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.keys.contains(key)
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.keys.contains(&FieldKey::Index(index))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.keys.contains(&FieldKey::Name(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<FieldKey> for UsedKeys {
    fn from_iter<I: IntoIterator<Item = FieldKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Resolve `key` followed by `accessors` against `args`.
///
/// The top-level key is recorded in `used` whenever it is bound, even if a
/// later accessor step fails. A default value from the policy is returned
/// for a missing key or a missing accessor step alike.
pub fn resolve<'a>(
    key: &FieldKey,
    accessors: &[Accessor],
    args: &'a Args,
    policy: &'a MissingKeyPolicy,
    used: &mut UsedKeys,
) -> TemplateResult<Resolution<'a>> {
    let top = match key {
        FieldKey::Index(i) => args.get_positional(*i),
        FieldKey::Name(name) => args.get_named(name),
    };
    let Some(mut value) = top else {
        return missing(key.to_string(), policy);
    };
    used.insert(key.clone());

    let mut path = key.to_string();
    for accessor in accessors {
        path.push_str(&accessor.to_string());
        let next = match accessor {
            Accessor::Attr(name) => value.get_attr(name),
            Accessor::Index(i) => value.get_index(*i),
            Accessor::Key(k) => value.get_key(k),
        };
        match next {
            Some(v) => value = v,
            None => return missing(path, policy),
        }
    }

    Ok(Resolution::Found(value))
}

fn missing(key: String, policy: &MissingKeyPolicy) -> TemplateResult<Resolution<'_>> {
    match policy {
        MissingKeyPolicy::Error => Err(TemplateError::MissingKey { key }),
        MissingKeyPolicy::LeaveLiteral => {
            tracing::debug!(key = %key, "Missing key left as literal");
            Ok(Resolution::LeaveLiteral)
        }
        MissingKeyPolicy::Default(value) => {
            tracing::debug!(key = %key, "Missing key replaced by default value");
            Ok(Resolution::Found(value))
        }
    }
}
