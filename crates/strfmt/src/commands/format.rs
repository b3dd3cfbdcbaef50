/*
 * format.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Format command implementation
 */

//! Format command implementation.
//!
//! Renders a brace template against positional values, `KEY=VALUE` pairs
//! and an optional JSON bindings file, then prints the result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use quarto_strfmt::{Formatter, FormatterOptions, MissingKeyPolicy, check_unused};

use crate::bindings::{collect_args, parse_scalar};

/// Arguments for the format command
#[derive(Debug)]
pub struct FormatArgs {
    pub template: String,
    pub positional: Vec<String>,
    pub named: Vec<String>,
    pub bindings: Option<PathBuf>,
    pub safe: bool,
    pub check_unused: bool,
    pub missing: Option<String>,
    pub config: Option<PathBuf>,
}

pub fn execute(args: FormatArgs) -> Result<()> {
    println!("{}", render(&args)?);
    Ok(())
}

fn render(args: &FormatArgs) -> Result<String> {
    let options = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            FormatterOptions::from_json_str(&json)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => FormatterOptions::default(),
    };
    debug!(?options, "Formatter options");

    let formatter = Formatter::builder().with_options(options).build();
    let template = formatter
        .parse(&args.template)
        .context("Failed to parse template")?;
    let bindings = collect_args(args.bindings.as_deref(), &args.positional, &args.named)?;

    let policy = match (&args.missing, args.safe) {
        (Some(missing), _) => MissingKeyPolicy::Default(parse_scalar(missing)),
        (None, true) => MissingKeyPolicy::LeaveLiteral,
        (None, false) => MissingKeyPolicy::Error,
    };
    let rendered = formatter
        .render(&template, &bindings, policy)
        .context("Failed to render template")?;

    if args.check_unused || formatter.options().reject_unused {
        check_unused(&bindings, &rendered.used)
            .into_result()
            .context("Template left bindings unused")?;
    }

    Ok(rendered.output)
}
