//! OData `$filter` expressions for the OpenFEMA API.

use crate::types::{IncidentMatch, SearchParams};

const INCIDENT_CONTAINS: &str =
    "(substringof('Fire',incidentType) or substringof('Wildfire',incidentType))";
const INCIDENT_EXACT: &str = "incidentType eq 'Fire'";

/// Quote a string literal, doubling embedded single quotes.
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `(field eq 'A' or field eq 'B')`, or `None` for an empty list.
fn any_of(field: &str, values: &[String]) -> Option<String> {
    let clauses: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| format!("{field} eq {}", literal(&v.to_ascii_uppercase())))
        .collect();
    if clauses.is_empty() {
        None
    } else {
        Some(format!("({})", clauses.join(" or ")))
    }
}

/// Build the `$filter` for a search.
pub fn build_filter(params: &SearchParams) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(
        match params.incident_match {
            IncidentMatch::Contains => INCIDENT_CONTAINS,
            IncidentMatch::Exact => INCIDENT_EXACT,
        }
        .to_string(),
    );
    parts.extend(any_of("damageCategoryCode", &params.categories));
    parts.extend(any_of("stateAbbreviation", &params.states));
    if let Some(start) = params.start {
        parts.push(format!("dateObligated ge '{}'", start.format("%Y-%m-%d")));
    }
    if let Some(end) = params.end {
        parts.push(format!("dateObligated le '{}'", end.format("%Y-%m-%d")));
    }

    parts.join(" and ")
}
