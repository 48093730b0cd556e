//! tabula-java subprocess provider.
//!
//! Invokes `java -jar tabula.jar --pages <spec> --format JSON <file>` and
//! decodes the JSON table list it prints on stdout.

use std::path::Path;
use std::process::Command;

use indexgrid_shared::{Grid, IndexGridError, PageSpec, Result, TabulaConfig};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::GridProvider;

/// Runs tabula-java once per document.
#[derive(Debug, Clone)]
pub struct TabulaProvider {
    java: String,
    jar: String,
    header_rows: usize,
    extra_args: Vec<String>,
}

impl TabulaProvider {
    pub fn new(config: &TabulaConfig) -> Self {
        Self {
            java: config.java.clone(),
            jar: config.jar.clone(),
            header_rows: config.header_rows,
            extra_args: config.extra_args.clone(),
        }
    }

    /// Arguments passed to the Java launcher for one document.
    pub fn command_args(&self, path: &Path, pages: &PageSpec) -> Vec<String> {
        let mut args = vec![
            "-jar".to_string(),
            self.jar.clone(),
            "--pages".to_string(),
            pages.to_string(),
            "--format".to_string(),
            "JSON".to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push(path.to_string_lossy().to_string());
        args
    }
}

impl GridProvider for TabulaProvider {
    #[instrument(skip_all, fields(path = %path.display(), %pages))]
    fn extract(&self, path: &Path, pages: &PageSpec) -> Result<Vec<Grid>> {
        let document = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let args = self.command_args(path, pages);
        debug!(java = %self.java, ?args, "spawning tabula");

        let output = Command::new(&self.java)
            .args(&args)
            .output()
            .map_err(|e| {
                IndexGridError::grid_extraction(&document, format!("failed to spawn {}: {e}", self.java))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(IndexGridError::grid_extraction(
                &document,
                format!(
                    "tabula exited with status {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let grids = parse_tabula_json(&stdout, self.header_rows)
            .map_err(|e| IndexGridError::grid_extraction(&document, e))?;

        info!(document = %document, grids = grids.len(), "tables extracted");
        Ok(grids)
    }

    fn name(&self) -> &str {
        "tabula"
    }
}

// ---------------------------------------------------------------------------
// JSON decoding
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TabulaTable {
    #[serde(default)]
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Debug, Deserialize)]
struct TabulaCell {
    #[serde(default)]
    text: String,
}

/// Decode tabula's JSON output into grids.
///
/// Blank cell text becomes a missing cell. The first `header_rows` rows of
/// each table are column labels and are dropped.
pub fn parse_tabula_json(json: &str, header_rows: usize) -> std::result::Result<Vec<Grid>, String> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }

    let tables: Vec<TabulaTable> =
        serde_json::from_str(json).map_err(|e| format!("invalid tabula JSON: {e}"))?;

    Ok(tables
        .into_iter()
        .map(|table| {
            let rows = table
                .data
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| {
                            let text = cell.text.trim().to_string();
                            (!text.is_empty()).then_some(text)
                        })
                        .collect()
                })
                .collect();
            Grid::new(rows).skip_rows(header_rows)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
      {"extraction_method":"stream","page_number":63,"top":80.0,"left":40.0,"width":500.0,"height":300.0,
       "data":[
         [{"top":80.0,"left":40.0,"width":20.0,"height":10.0,"text":"Indicador"},{"text":"Valor"}],
         [{"text":"1.1 Revenue Growth"},{"text":"12"}],
         [{"text":"1.2 Employee Count"},{"text":""}]
       ]},
      {"extraction_method":"stream","data":[[{"text":"Header"}],[{"text":"2.1 Exports"}]]}
    ]"#;

    #[test]
    fn decodes_tables_and_drops_header_rows() {
        let grids = parse_tabula_json(SAMPLE, 1).expect("decode");
        assert_eq!(grids.len(), 2);
        assert_eq!(grids[0].row_count(), 2);
        assert_eq!(
            grids[0].row(1).unwrap(),
            &[Some("1.2 Employee Count".to_string()), None]
        );
        assert_eq!(grids[1].row(0).unwrap(), &[Some("2.1 Exports".to_string())]);
    }

    #[test]
    fn header_rows_zero_keeps_everything() {
        let grids = parse_tabula_json(SAMPLE, 0).expect("decode");
        assert_eq!(grids[0].row_count(), 3);
    }

    #[test]
    fn empty_output_means_no_tables() {
        assert!(parse_tabula_json("  \n", 1).expect("decode").is_empty());
        assert!(parse_tabula_json("[]", 1).expect("decode").is_empty());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = parse_tabula_json("{not json", 1).unwrap_err();
        assert!(err.contains("invalid tabula JSON"));
    }

    #[test]
    fn command_line_shape() {
        let provider = TabulaProvider::new(&TabulaConfig {
            java: "java".into(),
            jar: "/opt/tabula.jar".into(),
            header_rows: 1,
            extra_args: vec!["--lattice".into()],
        });
        let pages: PageSpec = "63-65".parse().unwrap();
        let args = provider.command_args(Path::new("/in/2016.pdf"), &pages);
        assert_eq!(
            args,
            vec![
                "-jar",
                "/opt/tabula.jar",
                "--pages",
                "63-65",
                "--format",
                "JSON",
                "--lattice",
                "/in/2016.pdf"
            ]
        );
    }

    #[test]
    fn missing_launcher_is_a_grid_extraction_error() {
        let provider = TabulaProvider::new(&TabulaConfig {
            java: "indexgrid-no-such-java-binary".into(),
            ..TabulaConfig::default()
        });
        let pages: PageSpec = "1".parse().unwrap();
        let err = provider
            .extract(Path::new("2016.pdf"), &pages)
            .expect_err("spawn must fail");
        assert!(matches!(err, IndexGridError::GridExtraction { .. }));
    }
}
