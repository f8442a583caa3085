//! Per-applicant aggregation result.

use chrono::NaiveDate;
use serde::Serialize;

use super::Money;

/// One row per distinct applicantId.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilitySummary {
    pub applicant_id: String,
    pub applicant_name: String,
    pub state: String,
    pub total_federal_share_obligated: Money,
    pub project_count: usize,
    pub first_date_obligated: Option<NaiveDate>,
    pub last_date_obligated: Option<NaiveDate>,
}

/// Summary export column names, in order.
pub const SUMMARY_COLUMNS: [&str; 4] = [
    "applicantId",
    "applicantName",
    "totalFederalShareObligated",
    "projectCount",
];
