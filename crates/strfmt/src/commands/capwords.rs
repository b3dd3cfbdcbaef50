/*
 * capwords.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Capwords command implementation.

use anyhow::Result;

pub fn execute(text: &str, sep: Option<&str>) -> Result<()> {
    println!("{}", quarto_strfmt::capwords(text, sep));
    Ok(())
}
