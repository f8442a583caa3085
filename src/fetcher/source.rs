//! In-memory record source.

use async_trait::async_trait;
use std::path::Path;

use super::{odata, FetchError, FetchReport, GrantSource};
use crate::export::{self, ExportError};
use crate::types::{GrantRecord, SearchParams};

/// Serves a fixed set of records, applying the category, state and date
/// filters the upstream API would apply. Incident type is not part of a
/// [`GrantRecord`], so it is not re-checked.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    name: String,
    records: Vec<GrantRecord>,
}

impl SnapshotSource {
    pub fn new(records: Vec<GrantRecord>) -> Self {
        Self {
            name: "snapshot".to_string(),
            records,
        }
    }

    /// Load a project CSV written by [`export::write_projects`].
    pub fn from_csv(path: &Path) -> Result<Self, ExportError> {
        let file = std::fs::File::open(path).map_err(ExportError::Io)?;
        let records = export::read_projects(file)?;
        tracing::info!(path = %path.display(), records = records.len(), "Loaded project snapshot");
        Ok(Self {
            name: format!("csv:{}", path.display()),
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn passes(params: &SearchParams, r: &GrantRecord) -> bool {
        if !params.accepts_category(&r.category()) {
            return false;
        }
        let state = r.state.trim().to_ascii_uppercase();
        if !params.states.is_empty() && !params.states.contains(&state) {
            return false;
        }
        match r.date_obligated {
            Some(d) => {
                params.start.map_or(true, |s| d >= s) && params.end.map_or(true, |e| d <= e)
            }
            None => params.start.is_none() && params.end.is_none(),
        }
    }
}

#[async_trait]
impl GrantSource for SnapshotSource {
    async fn fetch(&self, params: &SearchParams) -> Result<FetchReport, FetchError> {
        let records: Vec<GrantRecord> = self
            .records
            .iter()
            .filter(|r| Self::passes(params, r))
            .cloned()
            .collect();

        Ok(FetchReport {
            filter: odata::build_filter(params),
            last_url: String::new(),
            total_count: records.len() as u64,
            rows_received: self.records.len(),
            rows_skipped: 0,
            pages: 1,
            records,
        })
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
