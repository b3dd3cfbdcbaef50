//! Command implementations for the strfmt CLI
//!
//! Each command module handles the CLI interface and delegates to
//! quarto-strfmt for the actual work.

pub mod capwords;
pub mod dollar;
pub mod format;
