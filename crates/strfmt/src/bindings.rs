/*
 * bindings.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Turning command-line arguments into template bindings.

use std::path::Path;

use anyhow::{Context, Result, bail};

use quarto_strfmt::{Args, Value};

/// Parse a command-line value: integer, then float, then boolean, then string.
pub fn parse_scalar(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = text.parse::<f64>() {
        // Keep words such as "inf" and "nan" as text.
        if f.is_finite() {
            return Value::Float(f);
        }
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Str(text.to_string()),
    }
}

/// Split a `KEY=VALUE` pair.
pub fn parse_named(pair: &str) -> Result<(String, Value)> {
    let Some((key, value)) = pair.split_once('=') else {
        bail!("Expected KEY=VALUE, got '{}'", pair);
    };
    if key.is_empty() {
        bail!("Empty key in '{}'", pair);
    }
    Ok((key.to_string(), parse_scalar(value)))
}

/// Load bindings from a JSON file.
pub fn load_bindings(path: &Path) -> Result<Args> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bindings file {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in bindings file {}", path.display()))?;
    Ok(Args::from_json(&json))
}

/// Combine a bindings file with positional values and `KEY=VALUE` pairs.
///
/// Positional values are appended after any from the file; named pairs
/// override file entries with the same key.
pub fn collect_args(file: Option<&Path>, positional: &[String], named: &[String]) -> Result<Args> {
    let mut args = match file {
        Some(path) => load_bindings(path)?,
        None => Args::new(),
    };
    for value in positional {
        args.push(parse_scalar(value));
    }
    for pair in named {
        let (key, value) = parse_named(pair)?;
        args.insert(key, value);
    }
    tracing::debug!(
        positional = args.positional_values().len(),
        named = args.named_values().len(),
        "Collected bindings"
    );
    Ok(args)
}
