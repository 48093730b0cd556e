//! Period and year derivation from document file names.
//!
//! File names carry their publication period, e.g. `report_2016-01.pdf`
//! (period `2016-01`, year `2016`) or `anuario2018.pdf` (period and year `2018`).

use regex::Regex;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// First `digits[-_]digits` group, else first run of digits.
static PERIOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+[-_]\d+|\d+").expect("period regex")
});

/// Separator between year and the rest of the period.
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-_]").expect("separator regex")
});

/// Publication period of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    /// Full token as found in the file name.
    pub token: String,
    /// Leading numeric component.
    pub year: String,
}

/// Extract the period token and year from a file name.
///
/// Returns `None` when the name contains no digits.
pub fn parse_period(file_name: &str) -> Option<Period> {
    let token = PERIOD_RE.find(file_name)?.as_str().to_string();
    let year = SEPARATOR_RE
        .split(&token)
        .next()
        .unwrap_or(&token)
        .to_string();
    Some(Period { token, year })
}
