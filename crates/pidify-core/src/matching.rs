//! Fuzzy comparison of organization names.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Lowercase and trim a registry name before scoring it.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().trim().to_string()
}

/// Reduce a name to its sorted, lowercased word tokens.
///
/// Text is NFC-composed first so accents split apart by PDF rendering compare
/// equal to the precomposed forms registries return.
fn sorted_tokens(name: &str) -> String {
    let composed: String = name.nfc().collect();
    let lowered = composed.to_lowercase();
    let spaced = NON_ALNUM.replace_all(&lowered, " ");
    let mut tokens: Vec<&str> = spaced.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-sort similarity on a 0-100 scale.
///
/// Both strings are tokenized, the tokens sorted and re-joined, and the
/// results compared with an edit-distance ratio, so word order does not
/// matter. Returns 0 when either side has no tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Does `candidate` name the same funder as `input`? The score must be
/// strictly above `threshold`.
pub fn funder_names_match(input: &str, candidate: &str, threshold: f64) -> bool {
    token_sort_ratio(input, &normalize_name(candidate)) > threshold
}
