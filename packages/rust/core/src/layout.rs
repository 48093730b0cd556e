//! Year-keyed layout policies.
//!
//! Each publication year lays its index table out differently. A
//! [`PolicyRegistry`] maps year ranges to one of a closed set of
//! [`LayoutPolicy`] variants; the policy turns the document's grids into
//! candidate strings, which are then filtered down to identifier-shaped ones.

use indexgrid_shared::{Cell, Grid};
use serde::Serialize;
use tracing::debug;

use crate::parser::{has_identifier, strip_dot_leader};

/// Rows of the transposed grid holding records under [`LayoutPolicy::TransposedRows`].
const TRANSPOSED_RECORD_ROWS: [usize; 2] = [0, 4];

/// Row of the transposed grid holding ready-made records under [`LayoutPolicy::CompositeRows`].
const COMPOSITE_RECORD_ROW: usize = 0;

/// Rows of the transposed grid joined into one record under [`LayoutPolicy::CompositeRows`]
/// (code row, then text row).
const COMPOSITE_JOINED_ROWS: (usize, usize) = (2, 3);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The grids do not have the shape a policy expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("policy {policy} needs at least one grid, got none")]
    NoGrids { policy: &'static str },

    #[error("policy {policy} needs row {index} of the transposed grid, which has {available} row(s)")]
    MissingRow {
        policy: &'static str,
        index: usize,
        available: usize,
    },

    #[error("policy {policy} needs a first column, but the grids have no columns")]
    NoColumns { policy: &'static str },
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// How a year's grids are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutPolicy {
    /// Single grid; transpose it and read rows 0 and 4, one record per column.
    TransposedRows,
    /// Any number of grids; stack them and read the first column, one record per row.
    FirstColumn,
    /// Single grid; transpose it and read row 0, followed by rows 2 and 3
    /// joined per column (code and text sit on adjacent rows). Records carry
    /// a table-of-contents dot leader that is stripped.
    CompositeRows,
}

impl LayoutPolicy {
    /// Stable name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransposedRows => "transposed-rows",
            Self::FirstColumn => "first-column",
            Self::CompositeRows => "composite-rows",
        }
    }

    /// Raw cell values selected by this policy, before any filtering.
    pub fn raw_candidates(&self, grids: &[Grid]) -> Result<Vec<Cell>, LayoutError> {
        let policy = self.name();
        match self {
            Self::TransposedRows => {
                let transposed = first_grid(grids, policy)?.transpose();
                let mut cells = Vec::new();
                for index in TRANSPOSED_RECORD_ROWS {
                    cells.extend_from_slice(row(&transposed, index, policy)?);
                }
                Ok(cells)
            }
            Self::FirstColumn => {
                if grids.is_empty() {
                    return Err(LayoutError::NoGrids { policy });
                }
                Grid::concat(grids)
                    .column(0)
                    .ok_or(LayoutError::NoColumns { policy })
            }
            Self::CompositeRows => {
                let transposed = first_grid(grids, policy)?.transpose();
                let records = row(&transposed, COMPOSITE_RECORD_ROW, policy)?;
                let (code_row, text_row) = COMPOSITE_JOINED_ROWS;
                let codes = row(&transposed, code_row, policy)?;
                let texts = row(&transposed, text_row, policy)?;

                // A column missing either its code or its text is not a record.
                let joined = codes.iter().zip(texts).map(|(code, text)| match (code, text) {
                    (Some(code), Some(text)) => Some(format!("{code} {text}")),
                    _ => None,
                });

                Ok(records.iter().cloned().chain(joined).collect())
            }
        }
    }

    /// Identifier-shaped candidates, in policy order.
    ///
    /// Missing cells are dropped. Under [`LayoutPolicy::CompositeRows`] the dot
    /// leader is stripped before the shape check. Survivors are trimmed.
    pub fn candidates(&self, grids: &[Grid]) -> Result<Vec<String>, LayoutError> {
        let raw = self.raw_candidates(grids)?;
        let total = raw.len();

        let kept: Vec<String> = raw
            .into_iter()
            .flatten()
            .map(|text| match self {
                Self::CompositeRows => strip_dot_leader(&text).to_string(),
                _ => text,
            })
            .filter(|text| has_identifier(text))
            .map(|text| text.trim().to_string())
            .collect();

        debug!(policy = self.name(), total, kept = kept.len(), "candidates filtered");
        Ok(kept)
    }
}

fn first_grid<'a>(grids: &'a [Grid], policy: &'static str) -> Result<&'a Grid, LayoutError> {
    grids.first().ok_or(LayoutError::NoGrids { policy })
}

fn row<'a>(grid: &'a Grid, index: usize, policy: &'static str) -> Result<&'a [Cell], LayoutError> {
    grid.row(index).ok_or(LayoutError::MissingRow {
        policy,
        index,
        available: grid.row_count(),
    })
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Outcome of looking a year up in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyResolution {
    Policy(LayoutPolicy),
    Unrecognized,
}

/// Inclusive range of publication years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub first: u16,
    pub last: u16,
}

impl YearRange {
    pub const fn new(first: u16, last: u16) -> Self {
        Self { first, last }
    }

    pub fn contains(&self, year: u16) -> bool {
        (self.first..=self.last).contains(&year)
    }
}

/// Built-in year → policy table.
const BUILTIN_POLICIES: [(YearRange, LayoutPolicy); 3] = [
    (YearRange::new(2014, 2015), LayoutPolicy::CompositeRows),
    (YearRange::new(2016, 2017), LayoutPolicy::TransposedRows),
    (YearRange::new(2018, 2019), LayoutPolicy::FirstColumn),
];

/// Maps publication years to layout policies. First matching range wins.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    entries: Vec<(YearRange, LayoutPolicy)>,
}

impl PolicyRegistry {
    /// Registry holding the built-in year ranges.
    pub fn new() -> Self {
        Self {
            entries: BUILTIN_POLICIES.to_vec(),
        }
    }

    /// Year ranges and their policies, in lookup order.
    pub fn entries(&self) -> &[(YearRange, LayoutPolicy)] {
        &self.entries
    }

    /// Policy for `year`. Anything but exactly four ASCII digits, or a year
    /// outside every listed range, is unrecognized.
    pub fn resolve(&self, year: &str) -> PolicyResolution {
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return PolicyResolution::Unrecognized;
        }
        let Ok(year) = year.parse::<u16>() else {
            return PolicyResolution::Unrecognized;
        };
        self.entries
            .iter()
            .find(|(range, _)| range.contains(year))
            .map_or(PolicyResolution::Unrecognized, |(_, policy)| {
                PolicyResolution::Policy(*policy)
            })
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Untransposed layout where each source row is one record
    /// column once transposed: col 0 header block, col 4 body block.
    fn transposed_rows_grid() -> Grid {
        Grid::from_text(vec![
            vec!["1.1 Revenue Growth", "x", "", "", "2.1 Exports Share"],
            vec!["Notes", "x", "", "", ""],
            vec!["1.2 Employee Count", "x", "", "", "2.2 Import Share"],
        ])
    }

    #[test]
    fn transposed_rows_reads_rows_zero_then_four() {
        let candidates = LayoutPolicy::TransposedRows
            .candidates(&[transposed_rows_grid()])
            .expect("candidates");
        assert_eq!(
            candidates,
            vec![
                "1.1 Revenue Growth",
                "1.2 Employee Count",
                "2.1 Exports Share",
                "2.2 Import Share",
            ]
        );
    }

    #[test]
    fn transposed_rows_uses_only_first_grid() {
        let extra = Grid::from_text(vec![vec!["9.9 Ignored", "", "", "", ""]]);
        let candidates = LayoutPolicy::TransposedRows
            .candidates(&[transposed_rows_grid(), extra])
            .expect("candidates");
        assert!(!candidates.iter().any(|c| c.starts_with("9.9")));
    }

    #[test]
    fn transposed_rows_needs_five_columns() {
        let narrow = Grid::from_text(vec![vec!["1.1 Revenue", "a", "b"]]);
        let err = LayoutPolicy::TransposedRows
            .candidates(&[narrow])
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::MissingRow {
                policy: "transposed-rows",
                index: 4,
                available: 3,
            }
        );
    }

    #[test]
    fn first_column_stacks_grids_in_order() {
        let a = Grid::from_text(vec![
            vec!["Indicador", "Valor"],
            vec!["1.1 Revenue Growth", "10"],
            vec!["1.2 Employee Count", "20"],
        ]);
        let b = Grid::from_text(vec![vec!["2.3 Exports", "x"], vec!["", "orphan"]]);

        let candidates = LayoutPolicy::FirstColumn.candidates(&[a, b]).expect("candidates");
        assert_eq!(
            candidates,
            vec!["1.1 Revenue Growth", "1.2 Employee Count", "2.3 Exports"]
        );
    }

    #[test]
    fn first_column_errors() {
        assert_eq!(
            LayoutPolicy::FirstColumn.candidates(&[]).unwrap_err(),
            LayoutError::NoGrids {
                policy: "first-column"
            }
        );
        assert!(matches!(
            LayoutPolicy::FirstColumn.candidates(&[Grid::default()]),
            Err(LayoutError::NoColumns { .. })
        ));
    }

    #[test]
    fn composite_rows_joins_code_and_text() {
        // Transposed rows: 0 = ready records, 2 = codes, 3 = texts.
        let grid = Grid::from_text(vec![
            vec!["1.1 Ready Record ......", "", "1.2", "Sample Title ...................."],
            vec!["Header", "", "1.3", "Other Title ....."],
            vec!["", "", "", "Orphan text"],
        ]);

        let candidates = LayoutPolicy::CompositeRows
            .candidates(&[grid])
            .expect("candidates");
        assert_eq!(
            candidates,
            vec!["1.1 Ready Record", "1.2 Sample Title", "1.3 Other Title"]
        );
    }

    #[test]
    fn composite_rows_drops_columns_without_code() {
        // Missing code cell: the text alone must not become a record, even
        // when it starts with an identifier of its own.
        let grid = Grid::from_text(vec![
            vec!["", "", "", "1.2 Title ....."],
            vec!["", "", "2.1", ""],
        ]);
        let candidates = LayoutPolicy::CompositeRows
            .candidates(&[grid])
            .expect("candidates");
        assert!(candidates.is_empty(), "unexpected candidates: {candidates:?}");
    }

    #[test]
    fn composite_rows_needs_four_columns() {
        let grid = Grid::from_text(vec![vec!["1.1 A", "", "1.2"]]);
        assert!(matches!(
            LayoutPolicy::CompositeRows.candidates(&[grid]),
            Err(LayoutError::MissingRow { index: 3, .. })
        ));
    }

    #[test]
    fn registry_resolves_builtin_years() {
        let registry = PolicyRegistry::new();
        assert_eq!(
            registry.resolve("2014"),
            PolicyResolution::Policy(LayoutPolicy::CompositeRows)
        );
        assert_eq!(
            registry.resolve("2017"),
            PolicyResolution::Policy(LayoutPolicy::TransposedRows)
        );
        assert_eq!(
            registry.resolve("2019"),
            PolicyResolution::Policy(LayoutPolicy::FirstColumn)
        );
        assert_eq!(registry.resolve("2020"), PolicyResolution::Unrecognized);
        assert_eq!(registry.resolve("2013"), PolicyResolution::Unrecognized);
        assert_eq!(registry.resolve("abcd"), PolicyResolution::Unrecognized);
    }

    #[test]
    fn year_must_be_exactly_four_digits() {
        let registry = PolicyRegistry::new();
        assert_eq!(registry.resolve("02016"), PolicyResolution::Unrecognized);
        assert_eq!(registry.resolve(" 2016"), PolicyResolution::Unrecognized);
        assert_eq!(registry.resolve("+2016"), PolicyResolution::Unrecognized);
        assert_eq!(registry.resolve("201"), PolicyResolution::Unrecognized);
        assert_eq!(
            registry.resolve("2016"),
            PolicyResolution::Policy(LayoutPolicy::TransposedRows)
        );
    }

    #[test]
    fn builtin_entries_are_listed_in_order() {
        let years: Vec<(u16, u16)> = PolicyRegistry::new()
            .entries()
            .iter()
            .map(|(range, _)| (range.first, range.last))
            .collect();
        assert_eq!(years, vec![(2014, 2015), (2016, 2017), (2018, 2019)]);
    }
}
