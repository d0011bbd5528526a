use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lowercases and strips diacritics: "Taboão da Serra" -> "taboao da serra".
pub fn fold_diacritics(input: &str) -> String {
    input
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
}

/// Case- and accent-insensitive substring test.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold_diacritics(haystack).contains(fold_diacritics(needle).trim())
}

/// Keeps only ASCII digits: "01310-100" -> "01310100".
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}
