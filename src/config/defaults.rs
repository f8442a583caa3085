//! System-wide default constants.
//!
//! Centralises the magic numbers of the fetch → filter → aggregate → export
//! pipeline. Grouped by subsystem for easy discovery.

// ============================================================================
// Upstream API (OpenFEMA)
// ============================================================================

/// OpenFEMA Public Assistance Grant Award Activities, v2.
pub const OPENFEMA_PA_GRANTS_URL: &str =
    "https://www.fema.gov/api/open/v2/PublicAssistanceGrantAwardActivities";

/// Rows requested per page (`$top`).
pub const PAGE_SIZE: usize = 1_000;

/// Largest `$top` OpenFEMA accepts.
pub const MAX_PAGE_SIZE: usize = 10_000;

/// HTTP request timeout for each page request (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 60;

/// Retries after the first failed attempt of a page request.
pub const MAX_RETRIES: u32 = 3;

/// Upper bound accepted for `api.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// First retry delay (milliseconds); doubles on each further attempt.
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Cap on a single retry delay (milliseconds).
pub const RETRY_MAX_DELAY_MS: u64 = 8_000;

/// Rows read before pagination stops, even when pages keep coming back full.
pub const MAX_RECORDS: usize = 500_000;

/// How much of an error response body is kept in the error message.
pub const ERROR_BODY_PREVIEW_CHARS: usize = 500;

// ============================================================================
// Search Defaults
// ============================================================================

/// Every Public Assistance damage category offered in the UI.
pub const ALL_CATEGORIES: [&str; 7] = ["A", "B", "C", "D", "E", "F", "G"];

/// Category F: public utilities (water, power, gas, sewer, communications).
pub const UTILITIES_CATEGORY: &str = "F";

/// Water / wastewater terms matched against applicant names and project titles.
pub const DEFAULT_INCLUDE_KEYWORDS: [&str; 22] = [
    "water",
    "water district",
    "water dept",
    "water department",
    "water authority",
    "water utility",
    "municipal water",
    "water & sewer",
    "water and sewer",
    "wastewater",
    "waste water",
    "sanitation",
    "sanitary",
    "sewer",
    "wtp",
    "water treatment",
    "waterworks",
    "water works",
    "aqueduct",
    "water supply",
    "water system",
    "irrigation district",
];

// ============================================================================
// Presentation
// ============================================================================

/// Rows of the project table and summary table returned to the page.
pub const TABLE_PREVIEW_ROWS: usize = 100;

/// Length of the "top utilities by total federal share" list.
pub const TOP_UTILITIES: usize = 20;

/// Download name of the project-level export.
pub const PROJECTS_CSV_FILENAME: &str = "fema_water_pa_fire_detailed.csv";

/// Download name of the per-applicant summary export.
pub const SUMMARY_CSV_FILENAME: &str = "fema_water_pa_fire_summary.csv";

/// Hint shown with an empty upstream result.
pub const EMPTY_RESULT_HINT: &str = "No results. Tips: remove state/date filters; include more \
categories (B/E often have wildfire water costs); use 'contains' for incidentType.";

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const SERVER_ADDR: &str = "0.0.0.0:8501";

/// Search outcomes kept for CSV download; the oldest is evicted first.
pub const RETAINED_SEARCHES: usize = 64;
