//! Search parameters submitted from the page or the CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;

/// How `incidentType` is matched upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentMatch {
    /// `incidentType` contains 'Fire' or 'Wildfire'
    #[default]
    Contains,
    /// `incidentType eq 'Fire'`
    Exact,
}

impl IncidentMatch {
    pub fn from_contains_flag(contains: bool) -> Self {
        if contains {
            Self::Contains
        } else {
            Self::Exact
        }
    }
}

/// A fully resolved search: upstream filters plus keyword lists.
///
/// Codes are kept upper-case and keywords lower-case; see
/// [`normalize_codes`] and [`normalize_keywords`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub states: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub categories: Vec<String>,
    pub incident_match: IncidentMatch,
    pub include_keywords: Vec<String>,
    pub exclude_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("invalid state code '{0}' (expected two letters)")]
    InvalidState(String),
    #[error("invalid damage category '{0}' (expected a single letter)")]
    InvalidCategory(String),
    #[error("invalid {field} date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}

impl SearchParams {
    /// The configured default search.
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            states: normalize_codes(&config.states),
            start: None,
            end: None,
            categories: normalize_codes(&config.categories),
            incident_match: IncidentMatch::from_contains_flag(config.incident_contains),
            include_keywords: normalize_keywords(&config.include_keywords),
            exclude_keywords: normalize_keywords(&config.exclude_keywords),
        }
    }

    /// Check codes and the date window.
    pub fn validate(&self) -> Result<(), SearchError> {
        if let Some(bad) = self.states.iter().find(|s| !is_state_code(s)) {
            return Err(SearchError::InvalidState(bad.clone()));
        }
        if let Some(bad) = self.categories.iter().find(|c| !is_category_code(c)) {
            return Err(SearchError::InvalidCategory(bad.clone()));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(SearchError::InvertedDateRange { start, end });
            }
        }
        Ok(())
    }

    /// Whether a record's category passes the requested category set.
    ///
    /// An empty set means no category restriction.
    pub fn accepts_category(&self, code: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == code)
    }
}

/// Search fields as submitted by the page or the command line.
///
/// Every field is optional; a missing field takes the configured default.
/// List fields are comma-separated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchRequest {
    pub states: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub categories: Option<String>,
    pub incident_contains: Option<bool>,
    pub include: Option<String>,
    pub exclude: Option<String>,
}

impl SearchRequest {
    /// Merge with `defaults`, normalise and validate.
    pub fn resolve(&self, defaults: &SearchConfig) -> Result<SearchParams, SearchError> {
        let mut params = SearchParams::from_config(defaults);
        if let Some(states) = &self.states {
            params.states = normalize_codes(&split_list(states));
        }
        if let Some(categories) = &self.categories {
            params.categories = normalize_codes(&split_list(categories));
        }
        if let Some(contains) = self.incident_contains {
            params.incident_match = IncidentMatch::from_contains_flag(contains);
        }
        if let Some(include) = &self.include {
            params.include_keywords = normalize_keywords(&split_list(include));
        }
        if let Some(exclude) = &self.exclude {
            params.exclude_keywords = normalize_keywords(&split_list(exclude));
        }
        params.start = parse_date_param("start", self.start.as_deref())?;
        params.end = parse_date_param("end", self.end.as_deref())?;
        params.validate()?;
        Ok(params)
    }
}

/// Two ASCII letters, e.g. `CA`.
pub fn is_state_code(code: &str) -> bool {
    let code = code.trim();
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

/// One ASCII letter, e.g. `F`.
pub fn is_category_code(code: &str) -> bool {
    let code = code.trim();
    code.len() == 1 && code.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Trim, upper-case and drop blanks.
pub fn normalize_codes<S: AsRef<str>>(codes: &[S]) -> Vec<String> {
    codes
        .iter()
        .map(|c| c.as_ref().trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Trim, lower-case and drop blanks.
pub fn normalize_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Split a comma-separated form value.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// Parse an optional `YYYY-MM-DD` form value; blank means unset.
pub fn parse_date_param(field: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, SearchError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| SearchError::InvalidDate {
                field,
                value: s.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_normalises() {
        let config = SearchConfig {
            include_keywords: vec!["  Water ".into(), "".into(), "SEWER".into()],
            exclude_keywords: vec![],
            categories: vec!["f".into(), " b".into()],
            incident_contains: false,
            states: vec!["ca".into()],
        };
        let p = SearchParams::from_config(&config);
        assert_eq!(p.include_keywords, vec!["water", "sewer"]);
        assert_eq!(p.categories, vec!["F", "B"]);
        assert_eq!(p.states, vec!["CA"]);
        assert_eq!(p.incident_match, IncidentMatch::Exact);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut p = SearchParams::from_config(&SearchConfig::default());
        p.start = NaiveDate::from_ymd_opt(2022, 1, 1);
        p.end = NaiveDate::from_ymd_opt(2021, 1, 1);
        assert!(matches!(
            p.validate(),
            Err(SearchError::InvertedDateRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_codes() {
        let mut p = SearchParams::from_config(&SearchConfig::default());
        p.states = vec!["CAL".into()];
        assert_eq!(p.validate(), Err(SearchError::InvalidState("CAL".into())));

        let mut p = SearchParams::from_config(&SearchConfig::default());
        p.categories = vec!["7".into()];
        assert_eq!(p.validate(), Err(SearchError::InvalidCategory("7".into())));
    }

    #[test]
    fn test_parse_date_param() {
        assert_eq!(parse_date_param("start", None), Ok(None));
        assert_eq!(parse_date_param("start", Some("  ")), Ok(None));
        assert_eq!(
            parse_date_param("start", Some("2020-09-01")),
            Ok(NaiveDate::from_ymd_opt(2020, 9, 1))
        );
        assert!(parse_date_param("end", Some("09/01/2020")).is_err());
    }

    #[test]
    fn test_request_overrides_defaults() {
        let req = SearchRequest {
            states: Some("ca, or".into()),
            start: Some("2020-01-01".into()),
            categories: Some("F,B".into()),
            incident_contains: Some(false),
            include: Some("Water, SEWER ,".into()),
            ..Default::default()
        };
        let p = req.resolve(&SearchConfig::default()).unwrap();
        assert_eq!(p.states, vec!["CA", "OR"]);
        assert_eq!(p.categories, vec!["F", "B"]);
        assert_eq!(p.incident_match, IncidentMatch::Exact);
        assert_eq!(p.include_keywords, vec!["water", "sewer"]);
        assert_eq!(p.start, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(p.end, None);
    }

    #[test]
    fn test_empty_request_uses_defaults() {
        let config = SearchConfig::default();
        let p = SearchRequest::default().resolve(&config).unwrap();
        assert_eq!(p, SearchParams::from_config(&config));
    }

    #[test]
    fn test_request_rejects_bad_input() {
        let req = SearchRequest {
            start: Some("2021-13-01".into()),
            ..Default::default()
        };
        assert!(matches!(
            req.resolve(&SearchConfig::default()),
            Err(SearchError::InvalidDate { field: "start", .. })
        ));

        let req = SearchRequest {
            start: Some("2022-01-01".into()),
            end: Some("2021-01-01".into()),
            ..Default::default()
        };
        assert!(req.resolve(&SearchConfig::default()).is_err());
    }

    #[test]
    fn test_empty_categories_accept_everything() {
        let mut p = SearchParams::from_config(&SearchConfig::default());
        assert!(p.accepts_category("F"));
        assert!(!p.accepts_category("B"));
        p.categories.clear();
        assert!(p.accepts_category("B"));
    }
}
