//! Property-Based Tests
//!
//! Invariants of the normalizer and the identifier shape:
//! - normalization is idempotent
//! - normalized text is lower-case ASCII alphanumerics separated by single spaces
//! - the identifier extracted from `N.M...` is exactly the leading `N.M`

use indexgrid_core::{RecordParser, extract_identifier, normalize, strip_dot_leader};
use indexgrid_shared::DEFAULT_DESCRIPTION_PATTERN;
use proptest::prelude::*;

// ============================================================================
// Normalizer Properties
// ============================================================================

/// Property: normalizing twice changes nothing
#[test]
fn proptest_normalize_idempotent() {
    proptest!(|(text in "\\PC{0,200}")| {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    });
}

/// Property: output alphabet is [a-z0-9 ] with no leading, trailing or double space
#[test]
fn proptest_normalize_alphabet() {
    proptest!(|(text in "\\PC{0,200}")| {
        let out = normalize(&text);
        prop_assert!(
            out.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' '),
            "unexpected character in {:?}", out
        );
        prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
        prop_assert!(!out.contains("  "));
    });
}

/// Property: accented Latin letters survive as their base letter
#[test]
fn proptest_normalize_keeps_base_letters() {
    proptest!(|(word in "[a-z]{1,12}")| {
        let accented: String = word.chars().map(|c| format!("{c}\u{0301}")).collect();
        prop_assert_eq!(normalize(&accented.to_uppercase()), word);
    });
}

// ============================================================================
// Identifier Properties
// ============================================================================

/// Property: the identifier of `N.M<rest>` is exactly `N.M`
#[test]
fn proptest_identifier_is_leading_prefix() {
    proptest!(|(major in "[0-9]{1,4}", minor in "[0-9]{1,4}", rest in "[ A-Za-z][ A-Za-z.]{0,40}")| {
        let identifier = format!("{major}.{minor}");
        let candidate = format!("{identifier}{rest}");
        prop_assert_eq!(extract_identifier(&candidate), Some(identifier.as_str()));
    });
}

/// Property: stripping a dot leader never changes the parsed identifier
#[test]
fn proptest_dot_leader_keeps_identifier() {
    proptest!(|(major in 1u32..100, minor in 1u32..100, title in "[A-Z][a-z]{2,10}( [a-z]{1,8}){0,3}", dots in 3usize..40)| {
        let candidate = format!("{major}.{minor} {title} {}", ".".repeat(dots));
        let parser = RecordParser::new(DEFAULT_DESCRIPTION_PATTERN).expect("pattern");
        let parsed = parser.parse(strip_dot_leader(&candidate)).expect("parse");
        prop_assert_eq!(parsed.identifier, format!("{major}.{minor}"));
        prop_assert_eq!(parsed.description, title);
    });
}
