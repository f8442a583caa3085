//! Search pipeline
//!
//! ```text
//! GrantSource::fetch  ->  classifier::filter_water_utilities  ->  aggregate::summarize
//! ```
//!
//! Stages run strictly in sequence. Nothing is kept between searches here;
//! the web layer retains recent [`SearchOutcome`]s for download.

use serde::Serialize;
use tracing::info;

use crate::aggregate;
use crate::classifier::{filter_water_utilities, KeywordSet};
use crate::fetcher::{FetchError, GrantSource};
use crate::types::{GrantRecord, Money, SearchParams, UtilitySummary};

/// Everything one search produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub params: SearchParams,
    /// `$filter` sent upstream
    pub filter: String,
    /// Last page URL requested (empty for in-memory sources)
    pub last_url: String,
    /// Total reported by the API
    pub total_count: u64,
    /// Records fetched after the category check
    pub fetched: usize,
    /// Water-utility project rows, in fetch order
    pub projects: Vec<GrantRecord>,
    /// Per-applicant totals, largest first
    pub summaries: Vec<UtilitySummary>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn grand_total(&self) -> Money {
        aggregate::grand_total(&self.projects)
    }
}

/// Fetch, classify and aggregate.
pub async fn run_search(
    source: &dyn GrantSource,
    params: &SearchParams,
) -> Result<SearchOutcome, FetchError> {
    let report = source.fetch(params).await?;
    let fetched = report.records.len();

    let keywords = KeywordSet::from_params(params);
    let projects = filter_water_utilities(&report.records, &keywords);
    let summaries = aggregate::summarize(&projects);

    info!(
        source = source.source_name(),
        fetched,
        projects = projects.len(),
        applicants = summaries.len(),
        "Search complete"
    );

    Ok(SearchOutcome {
        params: params.clone(),
        filter: report.filter,
        last_url: report.last_url,
        total_count: report.total_count,
        fetched,
        projects,
        summaries,
    })
}
