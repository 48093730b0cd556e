//! Candidate parsing: `"1.2 Some Description"` → identifier + description.
//!
//! Two textual conventions are recognised:
//! - plain records, `1.2 Description`, parsed by [`RecordParser`]
//! - table-of-contents lines with a dot leader, `1.2  Title .........`,
//!   parsed by [`parse_toc_line`] (and stripped by [`strip_dot_leader`])

use std::sync::LazyLock;

use indexgrid_shared::{IndexGridError, ParseError, Result};
use regex::Regex;

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Dotted two-part numeric identifier at the start, leading whitespace allowed.
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+\.\d+)").expect("identifier regex")
});

/// A run of three or more periods.
static DOT_LEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.{3,}").expect("dot leader regex")
});

/// Optional leading number, a lazily captured phrase, then two or more periods.
static TOC_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+(\.\d+)?\s+)?(.*?)\s+\.{2,}").expect("toc line regex")
});

// ---------------------------------------------------------------------------
// Identifier shape
// ---------------------------------------------------------------------------

/// Leading dotted identifier of `text`, if any (`"1.2 Foo"` → `"1.2"`).
pub fn extract_identifier(text: &str) -> Option<&str> {
    IDENTIFIER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether `text` starts with a dotted two-part numeric identifier.
pub fn has_identifier(text: &str) -> bool {
    IDENTIFIER_RE.is_match(text)
}

/// Keep only what precedes the first run of three or more periods.
pub fn strip_dot_leader(text: &str) -> &str {
    DOT_LEADER_RE.split(text).next().unwrap_or(text)
}

// ---------------------------------------------------------------------------
// RecordParser
// ---------------------------------------------------------------------------

/// Identifier and description of one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCandidate {
    pub identifier: String,
    pub description: String,
}

/// Parses candidates with a configurable description pattern.
#[derive(Debug, Clone)]
pub struct RecordParser {
    description_re: Regex,
}

impl RecordParser {
    /// Compile the description pattern. An invalid pattern is a config error.
    pub fn new(description_pattern: &str) -> Result<Self> {
        let description_re = Regex::new(description_pattern).map_err(|e| {
            IndexGridError::config(format!(
                "invalid description pattern '{description_pattern}': {e}"
            ))
        })?;
        Ok(Self { description_re })
    }

    pub fn pattern(&self) -> &str {
        self.description_re.as_str()
    }

    /// Split a candidate into identifier and description.
    ///
    /// The description is the first match of the description pattern anywhere
    /// in the candidate, trimmed.
    pub fn parse(&self, candidate: &str) -> std::result::Result<ParsedCandidate, ParseError> {
        let identifier = extract_identifier(candidate).ok_or_else(|| {
            ParseError::MissingIdentifier {
                candidate: candidate.to_string(),
            }
        })?;

        let description = self
            .description_re
            .find(candidate)
            .map(|m| m.as_str().trim())
            .filter(|d| !d.is_empty())
            .ok_or_else(|| ParseError::MissingDescription {
                candidate: candidate.to_string(),
                pattern: self.pattern().to_string(),
            })?;

        Ok(ParsedCandidate {
            identifier: identifier.to_string(),
            description: description.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Table-of-contents lines
// ---------------------------------------------------------------------------

/// Interpretation of a table-of-contents style line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocLine {
    /// `1.2  Title .......` → identifier `1.2`, title `Title`.
    Entry { identifier: String, title: String },
    /// Not a dot-leader line, or no leading identifier; the input unchanged.
    Unrecognized(String),
}

/// Parse `"1.2  Title ........"`. Lines of any other shape come back as
/// [`TocLine::Unrecognized`] rather than as an error.
pub fn parse_toc_line(text: &str) -> TocLine {
    let Some(caps) = TOC_LINE_RE.captures(text) else {
        return TocLine::Unrecognized(text.to_string());
    };
    let Some(identifier) = extract_identifier(text) else {
        return TocLine::Unrecognized(text.to_string());
    };

    let title = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    TocLine::Entry {
        identifier: identifier.to_string(),
        title: title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexgrid_shared::DEFAULT_DESCRIPTION_PATTERN;

    fn parser() -> RecordParser {
        RecordParser::new(DEFAULT_DESCRIPTION_PATTERN).expect("default pattern")
    }

    #[test]
    fn identifier_is_leading_dotted_number() {
        assert_eq!(extract_identifier("1.2 Sample"), Some("1.2"));
        assert_eq!(extract_identifier("  10.15Growth"), Some("10.15"));
        assert_eq!(extract_identifier("3.4.5 Deep"), Some("3.4"));
        assert_eq!(extract_identifier("Total 1.2"), None);
        assert_eq!(extract_identifier("12 Title"), None);
        assert_eq!(extract_identifier(".5 Half"), None);
    }

    #[test]
    fn parses_plain_record() {
        let parsed = parser().parse("1.1 Revenue Growth").expect("parse");
        assert_eq!(parsed.identifier, "1.1");
        assert_eq!(parsed.description, "Revenue Growth");
    }

    #[test]
    fn description_starts_at_first_capitalised_word() {
        let parsed = parser()
            .parse("4.2 (a) Tasa de Participación")
            .expect("parse");
        assert_eq!(parsed.description, "Tasa de Participación");
    }

    #[test]
    fn dot_leader_then_parse() {
        let stripped = strip_dot_leader("1.2 Sample Title ....................");
        assert_eq!(stripped, "1.2 Sample Title ");
        let parsed = parser().parse(stripped).expect("parse");
        assert_eq!(parsed.identifier, "1.2");
        assert_eq!(parsed.description, "Sample Title");
    }

    #[test]
    fn two_periods_are_not_a_leader() {
        assert_eq!(strip_dot_leader("1.2 A.. B"), "1.2 A.. B");
        assert_eq!(strip_dot_leader("no leader"), "no leader");
    }

    #[test]
    fn missing_identifier() {
        let err = parser().parse("Revenue Growth").unwrap_err();
        assert!(matches!(err, ParseError::MissingIdentifier { .. }));
    }

    #[test]
    fn missing_description() {
        let err = parser().parse("1.1 revenue growth").unwrap_err();
        match err {
            ParseError::MissingDescription { candidate, pattern } => {
                assert_eq!(candidate, "1.1 revenue growth");
                assert_eq!(pattern, DEFAULT_DESCRIPTION_PATTERN);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn custom_pattern() {
        let parser = RecordParser::new(r"[a-z ]+$").expect("pattern");
        let parsed = parser.parse("2.3 employee count").expect("parse");
        assert_eq!(parsed.description, "employee count");
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        let err = RecordParser::new("([A-Z").unwrap_err();
        assert!(matches!(err, IndexGridError::Config { .. }));
    }

    #[test]
    fn toc_line_entry() {
        assert_eq!(
            parse_toc_line("1.2  Nombre del indicador ........"),
            TocLine::Entry {
                identifier: "1.2".into(),
                title: "Nombre del indicador".into(),
            }
        );
    }

    #[test]
    fn toc_line_without_leader_or_identifier() {
        assert_eq!(
            parse_toc_line("1.2 Plain title"),
            TocLine::Unrecognized("1.2 Plain title".into())
        );
        assert_eq!(
            parse_toc_line("Introduction ......"),
            TocLine::Unrecognized("Introduction ......".into())
        );
    }
}
