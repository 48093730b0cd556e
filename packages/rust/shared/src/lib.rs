//! Shared types, error model, and configuration for indexgrid.
//!
//! This crate is the foundation depended on by all other indexgrid crates.
//! It provides:
//! - [`IndexGridError`] — the unified error type
//! - Domain types ([`SourceDocument`], [`Grid`], [`IndexRecord`], [`IndexTable`])
//! - Configuration ([`AppConfig`], [`ExtractionConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_DESCRIPTION_PATTERN, ExtractionConfig, ExtractionSection, OutputConfig,
    OutputFormat, ParseFailurePolicy, PathsConfig, TabulaConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, parse_page_specs,
};
pub use error::{IndexGridError, ParseError, Result};
pub use types::{Cell, Grid, IndexRecord, IndexTable, PageSpec, SourceDocument};
