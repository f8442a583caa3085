//! API route handlers
//!
//! - Liveness
//! - Search defaults for populating the form
//! - Search: fetch, classify, aggregate, retain the outcome under a fresh id
//! - CSV downloads of a retained outcome, addressed by that id

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::aggregate;
use crate::config::defaults::{
    ALL_CATEGORIES, EMPTY_RESULT_HINT, PROJECTS_CSV_FILENAME, RETAINED_SEARCHES,
    SUMMARY_CSV_FILENAME, TABLE_PREVIEW_ROWS, TOP_UTILITIES,
};
use crate::config::FinderConfig;
use crate::export;
use crate::fetcher::GrantSource;
use crate::pipeline::{run_search, SearchOutcome};
use crate::types::{GrantRecord, Money, SearchParams, SearchRequest, UtilitySummary};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct FinderState {
    /// Where grant records come from
    pub source: Arc<dyn GrantSource>,
    /// Effective configuration (search defaults live here)
    pub config: Arc<FinderConfig>,
    /// Recent search outcomes, served by the CSV downloads
    pub searches: Arc<RwLock<SearchStore>>,
}

impl FinderState {
    pub fn new(source: Arc<dyn GrantSource>, config: FinderConfig) -> Self {
        Self {
            source,
            config: Arc::new(config),
            searches: Arc::new(RwLock::new(SearchStore::new(RETAINED_SEARCHES))),
        }
    }
}

/// Search outcomes keyed by a random id, so each browser downloads its own
/// results. Bounded; inserting past capacity evicts the oldest entry.
pub struct SearchStore {
    outcomes: HashMap<Uuid, Arc<SearchOutcome>>,
    order: VecDeque<Uuid>,
    capacity: usize,
}

impl SearchStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            outcomes: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&mut self, outcome: Arc<SearchOutcome>) -> Uuid {
        let id = Uuid::new_v4();
        self.outcomes.insert(id, outcome);
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.outcomes.remove(&evicted);
                debug!(search_id = %evicted, "Evicted retained search");
            }
        }
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<SearchOutcome>> {
        self.outcomes.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub source: String,
    pub retained_searches: usize,
}

#[derive(Debug, Serialize)]
pub struct DefaultsResponse {
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub categories: Vec<String>,
    pub all_categories: Vec<&'static str>,
    pub incident_contains: bool,
    pub states: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Key for `/api/export/{search_id}/...`
    pub search_id: Uuid,
    pub params: SearchParams,
    pub filter: String,
    pub last_url: String,
    pub total_count: u64,
    pub fetched: usize,
    pub project_count: usize,
    pub applicant_count: usize,
    pub grand_total: Money,
    /// First rows of the project table
    pub projects: Vec<GrantRecord>,
    /// First rows of the summary table
    pub summaries: Vec<UtilitySummary>,
    /// Largest applicants by total federal share
    pub top: Vec<UtilitySummary>,
    /// Set when the upstream query itself returned nothing
    pub hint: Option<&'static str>,
}

impl SearchResponse {
    fn from_outcome(search_id: Uuid, outcome: &SearchOutcome) -> Self {
        Self {
            search_id,
            params: outcome.params.clone(),
            filter: outcome.filter.clone(),
            last_url: outcome.last_url.clone(),
            total_count: outcome.total_count,
            fetched: outcome.fetched,
            project_count: outcome.projects.len(),
            applicant_count: outcome.summaries.len(),
            grand_total: outcome.grand_total(),
            projects: outcome
                .projects
                .iter()
                .take(TABLE_PREVIEW_ROWS)
                .cloned()
                .collect(),
            summaries: outcome
                .summaries
                .iter()
                .take(TABLE_PREVIEW_ROWS)
                .cloned()
                .collect(),
            top: aggregate::top(&outcome.summaries, TOP_UTILITIES).to_vec(),
            hint: (outcome.fetched == 0).then_some(EMPTY_RESULT_HINT),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn get_health(State(state): State<FinderState>) -> Response {
    let retained_searches = state.searches.read().await.len();
    ApiResponse::ok(HealthResponse {
        status: "ok",
        source: state.source.source_name().to_string(),
        retained_searches,
    })
}

/// GET /api/defaults
pub async fn get_defaults(State(state): State<FinderState>) -> Response {
    let s = &state.config.search;
    ApiResponse::ok(DefaultsResponse {
        include_keywords: s.include_keywords.clone(),
        exclude_keywords: s.exclude_keywords.clone(),
        categories: s.categories.clone(),
        all_categories: ALL_CATEGORIES.to_vec(),
        incident_contains: s.incident_contains,
        states: s.states.clone(),
    })
}

/// GET /api/search
pub async fn search(
    State(state): State<FinderState>,
    Query(request): Query<SearchRequest>,
) -> Response {
    let params = match request.resolve(&state.config.search) {
        Ok(p) => p,
        Err(e) => return ApiErrorResponse::bad_request(e.to_string()),
    };

    match run_search(state.source.as_ref(), &params).await {
        Ok(outcome) => {
            let outcome = Arc::new(outcome);
            let search_id = state.searches.write().await.insert(Arc::clone(&outcome));
            ApiResponse::ok(SearchResponse::from_outcome(search_id, &outcome))
        }
        Err(e) => {
            warn!(error = %e, "Search failed");
            ApiErrorResponse::upstream(format!("OpenFEMA request failed: {e}"))
        }
    }
}

/// GET /api/export/:search_id/projects.csv
pub async fn export_projects(
    State(state): State<FinderState>,
    Path(search_id): Path<String>,
) -> Response {
    let Some(outcome) = retained(&state, &search_id).await else {
        return unknown_search(&search_id);
    };
    match export::projects_csv(&outcome.projects) {
        Ok(body) => csv_attachment(PROJECTS_CSV_FILENAME, body),
        Err(e) => ApiErrorResponse::internal(e.to_string()),
    }
}

/// GET /api/export/:search_id/summary.csv
pub async fn export_summary(
    State(state): State<FinderState>,
    Path(search_id): Path<String>,
) -> Response {
    let Some(outcome) = retained(&state, &search_id).await else {
        return unknown_search(&search_id);
    };
    match export::summaries_csv(&outcome.summaries) {
        Ok(body) => csv_attachment(SUMMARY_CSV_FILENAME, body),
        Err(e) => ApiErrorResponse::internal(e.to_string()),
    }
}

async fn retained(state: &FinderState, search_id: &str) -> Option<Arc<SearchOutcome>> {
    let id = Uuid::parse_str(search_id).ok()?;
    state.searches.read().await.get(&id)
}

fn unknown_search(search_id: &str) -> Response {
    ApiErrorResponse::not_found(format!(
        "No retained search '{search_id}'; run the search again"
    ))
}

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
