//! Core domain types for indexgrid.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::IndexGridError;

// ---------------------------------------------------------------------------
// PageSpec
// ---------------------------------------------------------------------------

/// Matches `55`, `63-65`, `1-3,7` (page numbers and ranges, comma-separated).
static PAGE_SPEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(-\d+)?(,\d+(-\d+)?)*$").expect("page spec regex")
});

/// Pages to read from one document, in the `63-65` / `55` / `1-3,7` form
/// understood by the grid provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageSpec(String);

impl PageSpec {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PageSpec {
    type Err = IndexGridError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if PAGE_SPEC_RE.is_match(&compact) {
            Ok(Self(compact))
        } else {
            Err(IndexGridError::config(format!(
                "invalid page specification '{s}': expected pages like '55' or '63-65'"
            )))
        }
    }
}

impl TryFrom<String> for PageSpec {
    type Error = IndexGridError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PageSpec> for String {
    fn from(spec: PageSpec) -> Self {
        spec.0
    }
}

impl fmt::Display for PageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// SourceDocument
// ---------------------------------------------------------------------------

/// One input document, paired with the pages to read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name (used as the document identifier in logs and reports).
    pub name: String,
    /// Full path handed to the grid provider.
    pub path: PathBuf,
    /// Period token from the file name, e.g. `2016-01` or `2018`.
    pub period: String,
    /// Leading numeric component of the period.
    pub year: String,
    /// Pages to extract tables from.
    pub pages: PageSpec,
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// One table cell; `None` when the extractor found nothing there.
pub type Cell = Option<String>;

/// One extracted tabular fragment: rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a grid from plain strings; empty strings become missing cells.
    pub fn from_text<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let text: String = cell.into();
                        (!text.is_empty()).then_some(text)
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom. Short rows yield missing cells.
    pub fn column(&self, index: usize) -> Option<Vec<Cell>> {
        if index >= self.column_count() {
            return None;
        }
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).cloned().flatten())
                .collect(),
        )
    }

    /// Rows become columns. Ragged rows are padded with missing cells.
    pub fn transpose(&self) -> Grid {
        let width = self.column_count();
        let rows = (0..width)
            .map(|c| {
                self.rows
                    .iter()
                    .map(|row| row.get(c).cloned().flatten())
                    .collect()
            })
            .collect();
        Grid { rows }
    }

    /// Stack several grids into one tall grid, keeping grid then row order.
    pub fn concat(grids: &[Grid]) -> Grid {
        Grid {
            rows: grids.iter().flat_map(|g| g.rows.iter().cloned()).collect(),
        }
    }

    /// Drop the first `n` rows.
    pub fn skip_rows(self, n: usize) -> Grid {
        Grid {
            rows: self.rows.into_iter().skip(n).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// IndexRecord / IndexTable
// ---------------------------------------------------------------------------

/// One row of the consolidated output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Dotted two-part numeric code, e.g. `1.2`.
    pub identifier: String,
    /// Description as extracted from the source.
    pub description: String,
    /// Publication year of the source document.
    pub year: String,
    /// Accent-free, lower-case, alphanumeric form of `description`.
    #[serde(rename = "normalizedDescription")]
    pub normalized_description: String,
}

/// The consolidated table: one row per record, fixed column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexTable {
    records: Vec<IndexRecord>,
}

impl IndexTable {
    /// Output column names, in order.
    pub const COLUMNS: [&'static str; 4] =
        ["identifier", "description", "year", "normalizedDescription"];

    pub fn new(records: Vec<IndexRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years present, in first-seen order.
    pub fn years(&self) -> Vec<&str> {
        let mut years: Vec<&str> = Vec::new();
        for record in &self.records {
            if !years.contains(&record.year.as_str()) {
                years.push(&record.year);
            }
        }
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_spec_accepts_pages_and_ranges() {
        let spec: PageSpec = "63-65".parse().expect("range");
        assert_eq!(spec.as_str(), "63-65");

        let spec: PageSpec = " 1-3, 7 ".parse().expect("list");
        assert_eq!(spec.as_str(), "1-3,7");
    }

    #[test]
    fn page_spec_rejects_garbage() {
        assert!("".parse::<PageSpec>().is_err());
        assert!("all".parse::<PageSpec>().is_err());
        assert!("3-".parse::<PageSpec>().is_err());
    }

    #[test]
    fn grid_transpose_pads_ragged_rows() {
        let grid = Grid::from_text(vec![vec!["a", "b", "c"], vec!["d"]]);
        let t = grid.transpose();
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.row(0).unwrap(), &[Some("a".into()), Some("d".into())]);
        assert_eq!(t.row(2).unwrap(), &[Some("c".into()), None]);
    }

    #[test]
    fn grid_column_and_concat() {
        let a = Grid::from_text(vec![vec!["1.1 A", "x"]]);
        let b = Grid::from_text(vec![vec!["2.1 B"], vec!["", "y"]]);
        let tall = Grid::concat(&[a, b]);
        assert_eq!(tall.row_count(), 3);
        assert_eq!(
            tall.column(0).unwrap(),
            vec![Some("1.1 A".into()), Some("2.1 B".into()), None]
        );
        assert!(tall.column(2).is_none());
    }

    #[test]
    fn table_serializes_with_fixed_column_names() {
        let table = IndexTable::new(vec![IndexRecord {
            identifier: "1.1".into(),
            description: "Revenue Growth".into(),
            year: "2016".into(),
            normalized_description: "revenue growth".into(),
        }]);
        let value = toml::Value::try_from(&table.records()[0]).expect("serialize");
        let keys: Vec<&String> = value.as_table().unwrap().keys().collect();
        for column in IndexTable::COLUMNS {
            assert!(keys.iter().any(|k| k.as_str() == column), "missing {column}");
        }
        assert_eq!(table.years(), vec!["2016"]);
    }
}
