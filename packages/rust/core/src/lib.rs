//! Layout reconciliation, record parsing and normalization for indexgrid.
//!
//! This crate turns the grids a [`GridProvider`](indexgrid_tables::GridProvider)
//! extracts from each yearly document into one consolidated index table
//! (see [`pipeline::IndexPipeline`]).

pub mod layout;
pub mod normalize;
pub mod parser;
pub mod pipeline;

pub use layout::{LayoutError, LayoutPolicy, PolicyRegistry, PolicyResolution, YearRange};
pub use normalize::normalize;
pub use parser::{
    ParsedCandidate, RecordParser, TocLine, extract_identifier, has_identifier, parse_toc_line,
    strip_dot_leader,
};
pub use pipeline::{
    DocumentOutcome, DocumentStatus, ExtractionOutput, ExtractionReport, IndexPipeline,
    ProgressReporter, SilentProgress, SkipReason,
};
