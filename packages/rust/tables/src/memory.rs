//! In-memory grid provider.

use std::collections::HashMap;
use std::path::Path;

use indexgrid_shared::{Grid, IndexGridError, PageSpec, Result};

use crate::GridProvider;

/// Serves pre-built grids keyed by document file name.
///
/// Documents registered with [`InMemoryProvider::fail`], or not registered at
/// all, report a grid extraction error.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    documents: HashMap<String, std::result::Result<Vec<Grid>, String>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the grids returned for `file_name`.
    pub fn with_grids(mut self, file_name: impl Into<String>, grids: Vec<Grid>) -> Self {
        self.documents.insert(file_name.into(), Ok(grids));
        self
    }

    /// Make extraction of `file_name` fail with `message`.
    pub fn fail(mut self, file_name: impl Into<String>, message: impl Into<String>) -> Self {
        self.documents.insert(file_name.into(), Err(message.into()));
        self
    }
}

impl GridProvider for InMemoryProvider {
    fn extract(&self, path: &Path, _pages: &PageSpec) -> Result<Vec<Grid>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        match self.documents.get(&name) {
            Some(Ok(grids)) => Ok(grids.clone()),
            Some(Err(message)) => Err(IndexGridError::grid_extraction(&name, message.as_str())),
            None => Err(IndexGridError::grid_extraction(&name, "no grids registered")),
        }
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
