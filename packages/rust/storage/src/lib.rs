//! Persistence of the consolidated index table.
//!
//! The table is only ever written whole, once the pipeline has finished.
//! Two formats are supported:
//! - CSV with header `identifier,description,year,normalizedDescription`,
//!   optionally prefixed with a UTF-8 byte order mark for spreadsheet tools
//! - JSON `{ "generated_at", "report", "records" }`

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexgrid_shared::{IndexGridError, IndexRecord, IndexTable, OutputFormat, Result};
use serde::Serialize;
use tracing::info;

/// UTF-8 byte order mark.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How the table is serialized.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub utf8_bom: bool,
}

impl From<&indexgrid_shared::OutputConfig> for OutputOptions {
    fn from(config: &indexgrid_shared::OutputConfig) -> Self {
        Self {
            format: config.format,
            utf8_bom: config.utf8_bom,
        }
    }
}

/// JSON document layout.
#[derive(Serialize)]
struct JsonDocument<'a, R: Serialize> {
    generated_at: DateTime<Utc>,
    report: &'a R,
    records: &'a [IndexRecord],
}

/// Write `table` to `path`, creating parent directories.
///
/// `report` is embedded in JSON output and ignored for CSV.
pub fn write_table<R: Serialize>(
    table: &IndexTable,
    report: &R,
    path: &Path,
    options: OutputOptions,
) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| IndexGridError::io(parent, e))?;
    }

    let file = File::create(path).map_err(|e| IndexGridError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    match options.format {
        OutputFormat::Csv => write_csv(table, &mut writer, options.utf8_bom)?,
        OutputFormat::Json => write_json(table, report, &mut writer)?,
    }

    writer.flush().map_err(|e| IndexGridError::io(path, e))?;
    info!(path = %path.display(), records = table.len(), format = ?options.format, "table written");
    Ok(path.to_path_buf())
}

/// Serialize `table` as CSV into `out`.
pub fn write_csv<W: Write>(table: &IndexTable, mut out: W, utf8_bom: bool) -> Result<()> {
    if utf8_bom {
        out.write_all(UTF8_BOM)
            .map_err(|e| IndexGridError::Output(e.to_string()))?;
    }

    let mut csv = csv::Writer::from_writer(out);
    // Written explicitly so an empty table still carries its columns.
    csv.write_record(IndexTable::COLUMNS)
        .map_err(|e| IndexGridError::Output(e.to_string()))?;
    for record in table.records() {
        csv.write_record([
            record.identifier.as_str(),
            record.description.as_str(),
            record.year.as_str(),
            record.normalized_description.as_str(),
        ])
        .map_err(|e| IndexGridError::Output(e.to_string()))?;
    }
    csv.flush().map_err(|e| IndexGridError::Output(e.to_string()))
}

/// Serialize `table` and `report` as pretty JSON into `out`.
pub fn write_json<R: Serialize, W: Write>(table: &IndexTable, report: &R, out: W) -> Result<()> {
    let doc = JsonDocument {
        generated_at: Utc::now(),
        report,
        records: table.records(),
    };
    serde_json::to_writer_pretty(out, &doc).map_err(|e| IndexGridError::Output(e.to_string()))
}
