//! Source document discovery.
//!
//! Lists the input directory, keeps files with a configured extension,
//! sorts them by file name and pairs them positionally with the configured
//! page specifications. The pairing is only as good as that ordering: page
//! spec `n` belongs to the `n`-th document in sorted order.

mod period;

use std::path::Path;

use indexgrid_shared::{IndexGridError, PageSpec, Result, SourceDocument};
use tracing::{debug, info, instrument, warn};

pub use period::{Period, parse_period};

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Enumerate the documents under `input_dir` and pair them with `page_specs`.
///
/// - A count mismatch between files and page specs is a warning; pairing
///   proceeds over the shorter of the two.
/// - A file whose name carries no period is skipped with a warning. It still
///   consumes its page spec, since pairing is positional.
#[instrument(skip_all, fields(input_dir = %input_dir.display()))]
pub fn discover_documents(
    input_dir: &Path,
    page_specs: &[PageSpec],
    extensions: &[String],
) -> Result<Vec<SourceDocument>> {
    if !input_dir.is_dir() {
        return Err(IndexGridError::config(format!(
            "input directory does not exist: {}",
            input_dir.display()
        )));
    }

    let files = list_files(input_dir, extensions)?;

    if files.len() != page_specs.len() {
        warn!(
            files = files.len(),
            page_specs = page_specs.len(),
            "document count does not match page spec count; check the page list"
        );
    }

    let documents = pair_with_pages(files, page_specs);

    info!(documents = documents.len(), "documents discovered");
    Ok(documents)
}

/// Pair sorted `(name, path)` entries with page specs, deriving the period.
pub fn pair_with_pages(
    files: Vec<(String, std::path::PathBuf)>,
    page_specs: &[PageSpec],
) -> Vec<SourceDocument> {
    files
        .into_iter()
        .zip(page_specs)
        .filter_map(|((name, path), pages)| {
            let Some(period) = parse_period(&name) else {
                warn!(document = %name, "no period in file name, skipping");
                return None;
            };
            debug!(document = %name, period = %period.token, %pages, "paired document");
            Some(SourceDocument {
                name,
                path,
                period: period.token,
                year: period.year,
                pages: pages.clone(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Regular files with a matching extension, sorted by file name.
fn list_files(dir: &Path, extensions: &[String]) -> Result<Vec<(String, std::path::PathBuf)>> {
    let entries = std::fs::read_dir(dir).map_err(|e| IndexGridError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IndexGridError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() || !has_extension(&path, extensions) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        files.push((name, path));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .map(|ext| ext.to_string_lossy())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)))
}
