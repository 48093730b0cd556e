//! Description normalization for lookup and search.
//!
//! Each pass is a function `&str -> String` applied in sequence; the order
//! matters (accents must be gone before the ASCII filter runs).

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalize a description: strip diacritics, lower-case, keep only ASCII
/// letters, digits and whitespace, collapse whitespace.
///
/// Pure and deterministic; `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut result = strip_diacritics(text);
    result = result.to_lowercase();
    result = keep_ascii_alphanumeric(&result);
    collapse_whitespace(&result)
}

/// Canonical decomposition, then drop the combining marks.
fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn keep_ascii_alphanumeric(text: &str) -> String {
    static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"[^a-z0-9\s\x1C-\x1F]").expect("valid regex")
    });

    NON_ALNUM_RE.replace_all(text, "").to_string()
}

/// Runs of whitespace become one space. The information separators
/// U+001C..U+001F count as whitespace here, although Unicode's White_Space
/// property leaves them out.
fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"[\s\x1C-\x1F]+").expect("valid regex")
    });

    WS_RE.replace_all(text, " ").trim().to_string()
}
