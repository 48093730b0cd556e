//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indexgrid_core::{
    DocumentOutcome, DocumentStatus, ExtractionReport, IndexPipeline, LayoutPolicy,
    PolicyResolution, ProgressReporter, RecordParser, TocLine, extract_identifier, normalize,
    parse_toc_line,
};
use indexgrid_shared::{
    AppConfig, ExtractionConfig, IndexTable, OutputFormat, PageSpec, ParseFailurePolicy,
    init_config, load_config, load_config_from, parse_page_specs,
};
use indexgrid_storage::OutputOptions;
use indexgrid_tables::{GridProvider, TabulaProvider};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// indexgrid — consolidate yearly index tables into one normalized table.
#[derive(Parser)]
#[command(
    name = "indexgrid",
    version,
    about = "Extract index identifiers and descriptions from yearly reports into one table.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.indexgrid/indexgrid.toml).
    #[arg(long, global = true, env = "INDEXGRID_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Output format flag.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Parse failure policy flag.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum ParseErrorArg {
    SkipCandidate,
    AbortDocument,
}

impl From<ParseErrorArg> for ParseFailurePolicy {
    fn from(arg: ParseErrorArg) -> Self {
        match arg {
            ParseErrorArg::SkipCandidate => ParseFailurePolicy::SkipCandidate,
            ParseErrorArg::AbortDocument => ParseFailurePolicy::AbortDocument,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Extract every document in the input directory into one table.
    Extract {
        /// Directory holding the source documents.
        #[arg(short, long, env = "INDEXGRID_INPUT_DIR")]
        input: Option<PathBuf>,

        /// Directory the table is written to.
        #[arg(short, long, env = "INDEXGRID_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Page specs, one per document in file-name order (`63-65;70-71;55`).
        #[arg(short, long)]
        pages: Vec<String>,

        /// Output format.
        #[arg(short, long)]
        format: Option<FormatArg>,

        /// What an unparsable candidate does to its document.
        #[arg(long)]
        on_parse_error: Option<ParseErrorArg>,

        /// Path to the tabula-java jar.
        #[arg(long, env = "INDEXGRID_TABULA_JAR")]
        tabula_jar: Option<String>,
    },

    /// Show the grids, policy and candidates for a single document.
    Inspect {
        /// Document to inspect.
        file: PathBuf,

        /// Pages to read.
        #[arg(short, long)]
        pages: String,

        /// Publication year (defaults to the one in the file name).
        #[arg(long)]
        year: Option<String>,

        /// Path to the tabula-java jar.
        #[arg(long, env = "INDEXGRID_TABULA_JAR")]
        tabula_jar: Option<String>,
    },

    /// Parse one candidate string and show how it would be recorded.
    Parse {
        /// Candidate text, e.g. "1.2 Sample Title ......".
        text: String,

        /// Description pattern (defaults to the configured one).
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Crates whose events are shown by default.
const LOG_TARGETS: [&str; 6] = [
    "indexgrid",
    "indexgrid_core",
    "indexgrid_discovery",
    "indexgrid_tables",
    "indexgrid_storage",
    "indexgrid_shared",
];

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    match cli.command {
        Command::Extract {
            input,
            output,
            pages,
            format,
            on_parse_error,
            tabula_jar,
        } => {
            let mut config = resolve_config(config_path.as_deref())?;
            if let Some(input) = input {
                config.paths.input_dir = input.to_string_lossy().to_string();
            }
            if let Some(output) = output {
                config.paths.output_dir = output.to_string_lossy().to_string();
            }
            if !pages.is_empty() {
                config.extraction.page_specs = parse_page_specs(&pages)?;
            }
            if let Some(format) = format {
                config.output.format = format.into();
            }
            if let Some(policy) = on_parse_error {
                config.extraction.on_parse_error = policy.into();
            }
            if let Some(jar) = tabula_jar {
                config.tabula.jar = jar;
            }
            cmd_extract(&config)
        }
        Command::Inspect {
            file,
            pages,
            year,
            tabula_jar,
        } => {
            let mut config = resolve_config(config_path.as_deref())?;
            if let Some(jar) = tabula_jar {
                config.tabula.jar = jar;
            }
            cmd_inspect(&config, &file, &pages, year.as_deref())
        }
        Command::Parse { text, pattern } => {
            let config = resolve_config(config_path.as_deref())?;
            let pattern = pattern.unwrap_or(config.extraction.description_pattern);
            cmd_parse(&text, &pattern)
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_extract(config: &AppConfig) -> Result<()> {
    let extraction = ExtractionConfig::from(config);

    info!(
        input = %extraction.input_dir.display(),
        page_specs = extraction.page_specs.len(),
        "starting extraction"
    );

    let documents = indexgrid_discovery::discover_documents(
        &extraction.input_dir,
        &extraction.page_specs,
        &extraction.file_extensions,
    )?;

    let provider = TabulaProvider::new(&config.tabula);
    let pipeline = IndexPipeline::new(&extraction, &provider)?;

    let reporter = CliProgress::new();
    let output = pipeline.run(&documents, &reporter)?;

    let options = OutputOptions::from(&config.output);
    let path = output_path(&extraction.output_dir, &config.paths.output_file, options.format);
    let written = indexgrid_storage::write_table(&output.table, &output.report, &path, options)?;

    print_table(&output.table);
    print_report(&output.table, &output.report);
    println!("  Saved:  {}", written.display());
    println!();

    Ok(())
}

fn cmd_inspect(config: &AppConfig, file: &Path, pages: &str, year: Option<&str>) -> Result<()> {
    let pages: PageSpec = pages.parse()?;
    let year = match year {
        Some(year) => year.to_string(),
        None => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            indexgrid_discovery::parse_period(&name)
                .map(|p| p.year)
                .ok_or_else(|| eyre!("no year in '{name}'; pass --year"))?
        }
    };

    let provider = TabulaProvider::new(&config.tabula);
    let pipeline = IndexPipeline::new(&ExtractionConfig::from(config), &provider)?;
    let grids = provider.extract(file, &pages)?;

    println!();
    println!("  Document: {}", file.display());
    println!("  Pages:    {pages}");
    println!("  Year:     {year}");
    println!("  Grids:    {}", grids.len());

    for (i, grid) in grids.iter().enumerate() {
        println!();
        println!(
            "  [grid {i}] {} row(s) x {} column(s)",
            grid.row_count(),
            grid.column_count()
        );
        for (r, row) in grid.rows().iter().enumerate() {
            let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("·")).collect();
            println!("    {r:>3} | {}", cells.join(" | "));
        }
    }

    println!();
    let registry = pipeline.registry();
    let policy: LayoutPolicy = match registry.resolve(&year) {
        PolicyResolution::Policy(policy) => policy,
        PolicyResolution::Unrecognized => {
            println!("  Policy:   none registered for {year}");
            let known: Vec<String> = registry
                .entries()
                .iter()
                .map(|(range, policy)| format!("{}-{} {}", range.first, range.last, policy.name()))
                .collect();
            println!("  Known:    {}", known.join(", "));
            println!();
            return Ok(());
        }
    };
    println!("  Policy:   {}", policy.name());

    let parser = pipeline.parser();
    match policy.candidates(&grids) {
        Ok(candidates) => {
            println!("  Candidates: {}", candidates.len());
            for candidate in &candidates {
                match parser.parse(candidate) {
                    Ok(parsed) => {
                        println!("    {:<8} {}", parsed.identifier, parsed.description)
                    }
                    Err(e) => println!("    !        {e}"),
                }
            }
        }
        Err(e) => println!("  Layout error: {e}"),
    }
    println!();

    Ok(())
}

fn cmd_parse(text: &str, pattern: &str) -> Result<()> {
    let parser = RecordParser::new(pattern)?;

    println!();
    println!("  Input:       {text:?}");
    println!(
        "  Identifier:  {}",
        extract_identifier(text).unwrap_or("(none)")
    );
    match parser.parse(indexgrid_core::strip_dot_leader(text)) {
        Ok(parsed) => {
            println!("  Description: {}", parsed.description);
            println!("  Normalized:  {}", normalize(&parsed.description));
        }
        Err(e) => println!("  Parse error: {e}"),
    }
    match parse_toc_line(text) {
        TocLine::Entry { identifier, title } => {
            println!("  TOC entry:   {identifier} / {title}")
        }
        TocLine::Unrecognized(_) => println!("  TOC entry:   (not a dot-leader line)"),
    }
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Output file path; JSON output swaps a `.csv` file name for `.json`.
fn output_path(dir: &Path, file_name: &str, format: OutputFormat) -> PathBuf {
    let path = dir.join(file_name);
    match format {
        OutputFormat::Json if path.extension().is_some_and(|e| e == "csv") => {
            path.with_extension("json")
        }
        _ => path,
    }
}

/// Print the table as aligned columns.
fn print_table(table: &IndexTable) {
    let headers = IndexTable::COLUMNS;
    let rows: Vec<[&str; 4]> = table
        .records()
        .iter()
        .map(|r| {
            [
                r.identifier.as_str(),
                r.description.as_str(),
                r.year.as_str(),
                r.normalized_description.as_str(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 4]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let rule = "=".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1));
    println!();
    println!("{rule}");
    println!("{}", line(headers));
    for row in rows {
        println!("{}", line(row));
    }
    println!("{rule}");
    println!();
}

fn print_report(table: &IndexTable, report: &ExtractionReport) {
    println!(
        "  Documents: {}/{} contributed",
        report.documents_contributing, report.documents_total
    );
    println!("  Years:     {}", table.years().join(", "));
    if report.candidates_rejected > 0 {
        println!("  Rejected candidates: {}", report.candidates_rejected);
    }
    for outcome in report.uncovered() {
        match &outcome.status {
            DocumentStatus::Skipped { message, .. } => {
                println!("  Skipped: {} ({}): {message}", outcome.document, outcome.year)
            }
            _ => println!("  Empty:   {} ({})", outcome.document, outcome.year),
        }
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn document_started(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Reading [{current}/{total}] {name}"));
    }

    fn document_finished(&self, outcome: &DocumentOutcome) {
        if let DocumentStatus::Skipped { reason, .. } = &outcome.status {
            self.spinner
                .println(format!("  skipped {} ({reason:?})", outcome.document));
        }
    }

    fn done(&self, _report: &ExtractionReport) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_extract_flags() {
        let cli = Cli::try_parse_from([
            "indexgrid",
            "-v",
            "extract",
            "--input",
            "/data/pdfs",
            "--pages",
            "63-65;70-71",
            "--format",
            "json",
            "--on-parse-error",
            "abort-document",
        ])
        .expect("parse");

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Extract {
                input,
                pages,
                format,
                on_parse_error,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("/data/pdfs")));
                assert_eq!(pages, vec!["63-65;70-71".to_string()]);
                assert!(matches!(format, Some(FormatArg::Json)));
                assert!(matches!(on_parse_error, Some(ParseErrorArg::AbortDocument)));
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn json_output_swaps_csv_extension() {
        let dir = Path::new("/out");
        assert_eq!(
            output_path(dir, "index_records.csv", OutputFormat::Json),
            PathBuf::from("/out/index_records.json")
        );
        assert_eq!(
            output_path(dir, "index_records.csv", OutputFormat::Csv),
            PathBuf::from("/out/index_records.csv")
        );
        assert_eq!(
            output_path(dir, "table.data", OutputFormat::Json),
            PathBuf::from("/out/table.data")
        );
    }
}
