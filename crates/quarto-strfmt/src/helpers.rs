/*
 * helpers.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Small string helpers.

/// Capitalize each word of `s`.
///
/// With `sep == None`, words are separated by runs of whitespace; leading
/// and trailing whitespace is dropped and words are rejoined with a single
/// space. With `Some(sep)`, `s` is split on exactly `sep` and rejoined with
/// it, so empty words survive. An empty separator cannot split anything,
/// so `Some("")` treats the whole string as one word.
///
/// Capitalizing uppercases a word's first character and lowercases the rest.
pub fn capwords(s: &str, sep: Option<&str>) -> String {
    match sep {
        None => s
            .split_whitespace()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
        Some("") => capitalize(s),
        Some(sep) => s.split(sep).map(capitalize).collect::<Vec<_>>().join(sep),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
