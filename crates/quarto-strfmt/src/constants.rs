/*
 * constants.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Character-class strings.

pub const ASCII_LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const ASCII_UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const ASCII_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const HEXDIGITS: &str = "0123456789abcdefABCDEF";
pub const OCTDIGITS: &str = "01234567";
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;
pub const WHITESPACE: &str = " \t\n\r\x0b\x0c";

/// Digits, letters, punctuation and whitespace.
pub const PRINTABLE: &str = concat!(
    "0123456789",
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ",
    r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##,
    " \t\n\r\x0b\x0c"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_compose() {
        assert_eq!(ASCII_LETTERS, format!("{ASCII_LOWERCASE}{ASCII_UPPERCASE}"));
        assert_eq!(
            PRINTABLE,
            format!("{DIGITS}{ASCII_LETTERS}{PUNCTUATION}{WHITESPACE}")
        );
    }

    #[test]
    fn test_classes_match_std_predicates() {
        assert!(PUNCTUATION.chars().all(|c| c.is_ascii_punctuation()));
        assert_eq!(PUNCTUATION.len(), 32);
        assert!(HEXDIGITS.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(WHITESPACE.chars().all(char::is_whitespace));
        assert_eq!(PRINTABLE.len(), 100);
    }
}
