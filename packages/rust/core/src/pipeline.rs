//! End-to-end extraction pipeline: documents → grids → candidates → records → table.

use indexgrid_shared::{
    ExtractionConfig, Grid, IndexGridError, IndexRecord, IndexTable, ParseFailurePolicy, Result,
    SourceDocument,
};
use indexgrid_tables::GridProvider;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::layout::{LayoutPolicy, PolicyRegistry, PolicyResolution};
use crate::normalize::normalize;
use crate::parser::RecordParser;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Why a document contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The grid provider failed.
    GridExtraction,
    /// No policy is registered for the document's year.
    UnrecognizedYear,
    /// The grids did not fit the policy's expected shape.
    Layout,
    /// A candidate failed to parse under [`ParseFailurePolicy::AbortDocument`].
    ParseAborted,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DocumentStatus {
    /// At least one record was produced.
    Contributed { records: usize },
    /// The policy ran but no candidate survived.
    Empty,
    /// The document was dropped.
    Skipped { reason: SkipReason, message: String },
}

/// Per-document entry of the [`ExtractionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOutcome {
    pub document: String,
    pub year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<LayoutPolicy>,
    #[serde(flatten)]
    pub status: DocumentStatus,
}

impl DocumentOutcome {
    pub fn records(&self) -> usize {
        match self.status {
            DocumentStatus::Contributed { records } => records,
            _ => 0,
        }
    }
}

/// Coverage of a run: how many documents made it into the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    pub documents_total: usize,
    pub documents_contributing: usize,
    /// Candidates dropped for parse errors under [`ParseFailurePolicy::SkipCandidate`].
    pub candidates_rejected: usize,
    pub outcomes: Vec<DocumentOutcome>,
}

impl ExtractionReport {
    /// Documents that contributed no record, for whatever reason.
    pub fn uncovered(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes.iter().filter(|o| o.records() == 0)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub table: IndexTable,
    pub report: ExtractionReport,
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called before a document's grids are extracted.
    fn document_started(&self, name: &str, current: usize, total: usize);
    /// Called once a document has been processed (or skipped).
    fn document_finished(&self, outcome: &DocumentOutcome);
    /// Called when every document has been processed.
    fn done(&self, report: &ExtractionReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn document_started(&self, _name: &str, _current: usize, _total: usize) {}
    fn document_finished(&self, _outcome: &DocumentOutcome) {}
    fn done(&self, _report: &ExtractionReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A record before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawRecord {
    identifier: String,
    description: String,
    year: String,
}

/// Records of one document plus the candidates it skipped.
#[derive(Debug)]
struct DocumentRecords {
    records: Vec<RawRecord>,
    rejected: usize,
}

/// Runs documents through a grid provider, the year registry and the parser.
pub struct IndexPipeline<'a> {
    provider: &'a dyn GridProvider,
    registry: PolicyRegistry,
    parser: RecordParser,
    on_parse_error: ParseFailurePolicy,
}

impl<'a> IndexPipeline<'a> {
    /// Build a pipeline with the built-in policy registry.
    ///
    /// Fails if the configured description pattern is not a valid regex.
    pub fn new(config: &ExtractionConfig, provider: &'a dyn GridProvider) -> Result<Self> {
        Ok(Self {
            provider,
            registry: PolicyRegistry::new(),
            parser: RecordParser::new(&config.description_pattern)?,
            on_parse_error: config.on_parse_error,
        })
    }

    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    /// Process every document in order and assemble the consolidated table.
    ///
    /// Per-document failures are logged and reported, never fatal. An empty
    /// result after all documents is [`IndexGridError::NoRecordsExtracted`].
    #[instrument(skip_all, fields(documents = documents.len(), provider = self.provider.name()))]
    pub fn run(
        &self,
        documents: &[SourceDocument],
        progress: &dyn ProgressReporter,
    ) -> Result<ExtractionOutput> {
        let total = documents.len();
        let mut accumulated: Vec<RawRecord> = Vec::new();
        let mut report = ExtractionReport {
            documents_total: total,
            ..ExtractionReport::default()
        };

        for (i, document) in documents.iter().enumerate() {
            progress.document_started(&document.name, i + 1, total);

            let policy = match self.registry.resolve(&document.year) {
                PolicyResolution::Policy(policy) => Some(policy),
                PolicyResolution::Unrecognized => None,
            };

            let status = match self.process_document(document, policy) {
                Ok(DocumentRecords { records, rejected }) => {
                    report.candidates_rejected += rejected;
                    let count = records.len();
                    accumulated.extend(records);
                    if count > 0 {
                        report.documents_contributing += 1;
                        DocumentStatus::Contributed { records: count }
                    } else {
                        DocumentStatus::Empty
                    }
                }
                Err(e) => skipped(document, e),
            };

            let outcome = DocumentOutcome {
                document: document.name.clone(),
                year: document.year.clone(),
                policy,
                status,
            };
            progress.document_finished(&outcome);
            report.outcomes.push(outcome);
        }

        progress.done(&report);

        if accumulated.is_empty() {
            return Err(IndexGridError::NoRecordsExtracted { documents: total });
        }

        let table = build_table(accumulated);
        info!(
            records = table.len(),
            contributing = report.documents_contributing,
            total,
            "index table built"
        );

        Ok(ExtractionOutput { table, report })
    }

    /// Grids → candidates → records for one document.
    fn process_document(
        &self,
        document: &SourceDocument,
        policy: Option<LayoutPolicy>,
    ) -> Result<DocumentRecords> {
        let Some(policy) = policy else {
            return Err(IndexGridError::UnrecognizedYear {
                document: document.name.clone(),
                year: document.year.clone(),
            });
        };

        info!(document = %document.name, pages = %document.pages, "reading document");
        let grids: Vec<Grid> = self.provider.extract(&document.path, &document.pages)?;

        let candidates = policy
            .candidates(&grids)
            .map_err(|e| IndexGridError::layout(&document.name, e.to_string()))?;

        debug!(
            document = %document.name,
            year = %document.year,
            policy = policy.name(),
            grids = grids.len(),
            candidates = candidates.len(),
            "candidates selected"
        );

        let mut records = Vec::with_capacity(candidates.len());
        let mut rejected = 0;
        for candidate in &candidates {
            match self.parser.parse(candidate) {
                Ok(parsed) => records.push(RawRecord {
                    identifier: parsed.identifier,
                    description: parsed.description,
                    year: document.year.clone(),
                }),
                Err(e) => match self.on_parse_error {
                    ParseFailurePolicy::SkipCandidate => {
                        warn!(document = %document.name, year = %document.year, error = %e, "skipping candidate");
                        rejected += 1;
                    }
                    ParseFailurePolicy::AbortDocument => return Err(e.into()),
                },
            }
        }

        Ok(DocumentRecords { records, rejected })
    }
}

/// Log a per-document failure and turn it into a skip status.
fn skipped(document: &SourceDocument, err: IndexGridError) -> DocumentStatus {
    let reason = match &err {
        IndexGridError::UnrecognizedYear { .. } => {
            warn!(document = %document.name, year = %document.year, "no extraction logic for year, skipping");
            SkipReason::UnrecognizedYear
        }
        IndexGridError::Parse(_) => {
            error!(document = %document.name, year = %document.year, error = %err, "candidate parse failed, dropping document");
            SkipReason::ParseAborted
        }
        IndexGridError::Layout { .. } => {
            error!(document = %document.name, year = %document.year, error = %err, "unexpected table layout, skipping");
            SkipReason::Layout
        }
        _ => {
            error!(document = %document.name, year = %document.year, error = %err, "could not read tables, skipping");
            SkipReason::GridExtraction
        }
    };
    DocumentStatus::Skipped {
        reason,
        message: err.to_string(),
    }
}

/// Attach normalized descriptions and fix the column order.
fn build_table(records: Vec<RawRecord>) -> IndexTable {
    IndexTable::new(
        records
            .into_iter()
            .map(|r| IndexRecord {
                normalized_description: normalize(&r.description),
                identifier: r.identifier,
                description: r.description,
                year: r.year,
            })
            .collect(),
    )
}
