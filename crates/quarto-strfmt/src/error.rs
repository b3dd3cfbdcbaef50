/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template parsing and substitution.

use thiserror::Error;

/// Errors that can occur during template operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    /// The template source itself is structurally invalid.
    #[error("Malformed template at offset {offset}: {message}")]
    MalformedTemplate { message: String, offset: usize },

    /// A placeholder referenced a key that is not bound.
    #[error("Missing key: {key}")]
    MissingKey { key: String },

    /// A `!x` conversion tag that is neither built in nor registered.
    #[error("Unknown conversion specifier: {conversion}")]
    UnknownConversion { conversion: char },

    /// The format spec could not be parsed or does not fit the value.
    #[error("Invalid format spec '{spec}': {message}")]
    InvalidFormatSpec { spec: String, message: String },

    /// Bindings that were supplied but never referenced.
    ///
    /// Only produced by the opt-in unused-argument check.
    #[error("Unused bindings: positions {positional:?}, names {named:?}")]
    UnusedBindings {
        positional: Vec<usize>,
        named: Vec<String>,
    },
}

impl TemplateError {
    pub(crate) fn malformed(message: impl Into<String>, offset: usize) -> Self {
        TemplateError::MalformedTemplate {
            message: message.into(),
            offset,
        }
    }

    pub(crate) fn invalid_spec(spec: &str, message: impl Into<String>) -> Self {
        TemplateError::InvalidFormatSpec {
            spec: spec.to_string(),
            message: message.into(),
        }
    }

    /// True for errors that safe substitution recovers from.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, TemplateError::MissingKey { .. })
    }
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
