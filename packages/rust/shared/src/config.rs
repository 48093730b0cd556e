//! Application configuration for indexgrid.
//!
//! User config lives at `~/.indexgrid/indexgrid.toml`.
//! CLI flags (and their environment variables) override config file values,
//! which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IndexGridError, Result};
use crate::types::PageSpec;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "indexgrid.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".indexgrid";

/// Description pattern used when none is configured: the first capitalised
/// word and everything after it.
pub const DEFAULT_DESCRIPTION_PATTERN: &str = r"([A-Z])\w.+";

// ---------------------------------------------------------------------------
// Config structs (matching indexgrid.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input/output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Page selection and record parsing.
    #[serde(default)]
    pub extraction: ExtractionSection,

    /// tabula-java invocation.
    #[serde(default)]
    pub tabula: TabulaConfig,

    /// Output serialization.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the source documents.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Directory the consolidated table is written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File name of the consolidated table inside `output_dir`.
    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            output_file: default_output_file(),
        }
    }
}

fn default_input_dir() -> String {
    "data/pdfs".into()
}
fn default_output_dir() -> String {
    "data/raw".into()
}
fn default_output_file() -> String {
    "index_records.csv".into()
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSection {
    /// One page specification per document, in sorted file-name order.
    #[serde(default = "default_page_specs")]
    pub page_specs: Vec<PageSpec>,

    /// Regex locating the description inside a candidate.
    #[serde(default = "default_description_pattern")]
    pub description_pattern: String,

    /// What an unparsable candidate does to the rest of its document.
    #[serde(default)]
    pub on_parse_error: ParseFailurePolicy,

    /// File extensions (without dot) considered source documents.
    #[serde(default = "default_file_extensions")]
    pub file_extensions: Vec<String>,
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            page_specs: default_page_specs(),
            description_pattern: default_description_pattern(),
            on_parse_error: ParseFailurePolicy::default(),
            file_extensions: default_file_extensions(),
        }
    }
}

fn default_page_specs() -> Vec<PageSpec> {
    ["63-65", "70-71", "55", "95", "111", "121"]
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect()
}
fn default_description_pattern() -> String {
    DEFAULT_DESCRIPTION_PATTERN.into()
}
fn default_file_extensions() -> Vec<String> {
    vec!["pdf".into()]
}

/// How a candidate that fails to parse affects its document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseFailurePolicy {
    /// Drop the offending candidate, keep the rest of the document.
    #[default]
    SkipCandidate,
    /// Drop every record of the document (first failure ends it).
    AbortDocument,
}

/// `[tabula]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabulaConfig {
    /// Java launcher.
    #[serde(default = "default_java")]
    pub java: String,

    /// Path to the tabula-java jar.
    #[serde(default = "default_jar")]
    pub jar: String,

    /// Leading rows of each table treated as column labels and dropped.
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,

    /// Extra arguments passed before the document path (e.g. `--lattice`).
    #[serde(default = "default_extra_args")]
    pub extra_args: Vec<String>,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            java: default_java(),
            jar: default_jar(),
            header_rows: default_header_rows(),
            extra_args: default_extra_args(),
        }
    }
}

fn default_java() -> String {
    "java".into()
}
fn default_jar() -> String {
    "tabula.jar".into()
}
fn default_header_rows() -> usize {
    1
}
fn default_extra_args() -> Vec<String> {
    vec!["--guess".into()]
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Serialization format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Prefix CSV output with a UTF-8 byte order mark.
    #[serde(default = "default_true")]
    pub utf8_bom: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            utf8_bom: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Serialization format of the consolidated table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

// ---------------------------------------------------------------------------
// Extraction config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime extraction configuration — merged from config file + CLI flags
/// and passed explicitly into the pipeline.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Directory holding the source documents.
    pub input_dir: PathBuf,
    /// Directory the consolidated table is written to.
    pub output_dir: PathBuf,
    /// Page specifications, paired positionally with sorted documents.
    pub page_specs: Vec<PageSpec>,
    /// Regex locating the description inside a candidate.
    pub description_pattern: String,
    /// Scope of a candidate parse failure.
    pub on_parse_error: ParseFailurePolicy,
    /// Extensions considered source documents.
    pub file_extensions: Vec<String>,
}

impl From<&AppConfig> for ExtractionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            input_dir: PathBuf::from(&config.paths.input_dir),
            output_dir: PathBuf::from(&config.paths.output_dir),
            page_specs: config.extraction.page_specs.clone(),
            description_pattern: config.extraction.description_pattern.clone(),
            on_parse_error: config.extraction.on_parse_error,
            file_extensions: config.extraction.file_extensions.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.indexgrid/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| IndexGridError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.indexgrid/indexgrid.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| IndexGridError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        IndexGridError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| IndexGridError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| IndexGridError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| IndexGridError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Parse page specs given on the command line, `;`-separated
/// (`"63-65;70-71;55"`) or one spec per flag occurrence.
pub fn parse_page_specs<S: AsRef<str>>(raw: &[S]) -> Result<Vec<PageSpec>> {
    raw.iter()
        .flat_map(|s| s.as_ref().split(';').map(str::to_owned).collect::<Vec<_>>())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<PageSpec>())
        .collect()
}
