/*
 * dollar.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Dollar and identifiers command implementations
 */

//! Dollar-template commands.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quarto_strfmt::DollarTemplate;

use crate::bindings::collect_args;

/// Arguments for the dollar command
#[derive(Debug)]
pub struct DollarArgs {
    pub template: String,
    pub named: Vec<String>,
    pub bindings: Option<PathBuf>,
    pub safe: bool,
    pub delimiter: String,
}

pub fn execute(args: DollarArgs) -> Result<()> {
    println!("{}", render(&args)?);
    Ok(())
}

/// Print each identifier of a dollar template on its own line.
pub fn identifiers(template: &str, delimiter: &str) -> Result<()> {
    let template = DollarTemplate::with_delimiter(template, delimiter);
    if !template.is_valid() {
        tracing::warn!("Template contains invalid placeholders");
    }
    for id in template.get_identifiers() {
        println!("{}", id);
    }
    Ok(())
}

fn render(args: &DollarArgs) -> Result<String> {
    let template = DollarTemplate::with_delimiter(args.template.as_str(), args.delimiter.as_str());
    let bindings = collect_args(args.bindings.as_deref(), &[], &args.named)?;
    if args.safe {
        Ok(template.safe_substitute(&bindings))
    } else {
        template
            .substitute(&bindings)
            .context("Failed to render template")
    }
}
