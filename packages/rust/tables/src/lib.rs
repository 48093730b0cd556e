//! Grid providers: turning a source document into extracted tables.
//!
//! This crate provides:
//! - [`GridProvider`] — the seam between the pipeline and table extraction
//! - [`TabulaProvider`] — runs tabula-java and decodes its JSON output
//! - [`InMemoryProvider`] — canned grids keyed by file name, for tests and dry runs

mod memory;
mod tabula;

use std::path::Path;

use indexgrid_shared::{Grid, PageSpec, Result};

pub use memory::InMemoryProvider;
pub use tabula::{TabulaProvider, parse_tabula_json};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Extracts the tables found on the given pages of a document.
///
/// Implementations return grids in page order, then in on-page order.
/// Failures are reported as [`IndexGridError::GridExtraction`] and are
/// isolated per document by the caller.
///
/// [`IndexGridError::GridExtraction`]: indexgrid_shared::IndexGridError::GridExtraction
pub trait GridProvider {
    /// Extract every table on `pages` of the document at `path`.
    fn extract(&self, path: &Path, pages: &PageSpec) -> Result<Vec<Grid>>;

    /// Human-readable provider name for tracing.
    fn name(&self) -> &str;
}
