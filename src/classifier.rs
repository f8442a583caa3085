//! Water-utility classification by keyword.
//!
//! A record is kept when its applicant name or project title contains any
//! include keyword (case-insensitive), unless its applicant name contains an
//! exclude keyword.

use crate::types::{normalize_keywords, GrantRecord, SearchParams};

/// Normalised include / exclude keyword lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl KeywordSet {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Self {
        Self {
            include: normalize_keywords(include),
            exclude: normalize_keywords(exclude),
        }
    }

    pub fn from_params(params: &SearchParams) -> Self {
        Self::new(&params.include_keywords, &params.exclude_keywords)
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Whether the record looks like a water utility.
    ///
    /// An empty include list matches nothing.
    pub fn matches(&self, record: &GrantRecord) -> bool {
        let name = record.applicant_name.to_lowercase();
        if self.exclude.iter().any(|k| name.contains(k.as_str())) {
            return false;
        }
        let title = record.project_title.to_lowercase();
        self.include
            .iter()
            .any(|k| name.contains(k.as_str()) || title.contains(k.as_str()))
    }
}

/// Keep the water-utility records, preserving input order.
pub fn filter_water_utilities(records: &[GrantRecord], keywords: &KeywordSet) -> Vec<GrantRecord> {
    records
        .iter()
        .filter(|r| keywords.matches(r))
        .cloned()
        .collect()
}
