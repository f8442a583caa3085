//! Public Assistance project-worksheet records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;
use super::Money;

/// One Public Assistance project-worksheet entry from OpenFEMA.
///
/// Deserializes from the upstream JSON (`stateAbbreviation` and friends,
/// missing fields defaulted). Serializes with the export column names, in
/// export column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GrantRecord {
    #[serde(rename = "state", alias = "stateAbbreviation", deserialize_with = "lenient::string")]
    pub state: String,

    #[serde(deserialize_with = "lenient::string")]
    pub applicant_id: String,

    #[serde(deserialize_with = "lenient::string")]
    pub applicant_name: String,

    #[serde(
        deserialize_with = "lenient::date",
        serialize_with = "lenient::serialize_date"
    )]
    pub date_obligated: Option<NaiveDate>,

    #[serde(deserialize_with = "lenient::money")]
    pub federal_share_obligated: Money,

    #[serde(deserialize_with = "lenient::string")]
    pub project_title: String,

    /// Upstream sends an integer; kept as text so leading zeros survive.
    #[serde(deserialize_with = "lenient::string")]
    pub pw_number: String,

    #[serde(deserialize_with = "lenient::int")]
    pub version_number: i64,

    #[serde(deserialize_with = "lenient::int")]
    pub disaster_number: i64,

    #[serde(deserialize_with = "lenient::string")]
    pub county: String,

    #[serde(deserialize_with = "lenient::string")]
    pub damage_category_code: String,
}

impl GrantRecord {
    /// Damage category normalised for comparison.
    pub fn category(&self) -> String {
        self.damage_category_code.trim().to_ascii_uppercase()
    }
}

/// Export column names, in order.
pub const PROJECT_COLUMNS: [&str; 11] = [
    "state",
    "applicantId",
    "applicantName",
    "dateObligated",
    "federalShareObligated",
    "projectTitle",
    "pwNumber",
    "versionNumber",
    "disasterNumber",
    "county",
    "damageCategoryCode",
];

/// Fields requested from the API (`$select`).
pub const UPSTREAM_SELECT_FIELDS: [&str; 12] = [
    "stateAbbreviation",
    "applicantId",
    "applicantName",
    "dateObligated",
    "federalShareObligated",
    "projectTitle",
    "pwNumber",
    "versionNumber",
    "disasterNumber",
    "county",
    "damageCategoryCode",
    "incidentType",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_upstream_row() {
        let row = serde_json::json!({
            "stateAbbreviation": "CA",
            "applicantId": "007-99007-00",
            "applicantName": "Paradise Irrigation District",
            "dateObligated": "2020-06-12T00:00:00.000Z",
            "federalShareObligated": 1250000.5,
            "projectTitle": "Water distribution system repairs",
            "pwNumber": 412,
            "versionNumber": 2,
            "disasterNumber": 4407,
            "county": "Butte",
            "damageCategoryCode": "F",
            "incidentType": "Fire"
        });
        let r: GrantRecord = serde_json::from_value(row).unwrap();
        assert_eq!(r.state, "CA");
        assert_eq!(r.pw_number, "412");
        assert_eq!(r.version_number, 2);
        assert_eq!(r.disaster_number, 4407);
        assert_eq!(r.federal_share_obligated, Money::from_cents(125_000_050));
        assert_eq!(r.date_obligated, NaiveDate::from_ymd_opt(2020, 6, 12));
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let row = serde_json::json!({
            "applicantId": "X",
            "county": null,
            "versionNumber": "not-a-number",
            "dateObligated": "unknown"
        });
        let r: GrantRecord = serde_json::from_value(row).unwrap();
        assert_eq!(r.applicant_id, "X");
        assert_eq!(r.state, "");
        assert_eq!(r.county, "");
        assert_eq!(r.version_number, 0);
        assert_eq!(r.date_obligated, None);
        assert_eq!(r.federal_share_obligated, Money::ZERO);
    }

    #[test]
    fn test_unreadable_amount_keeps_the_row() {
        for amount in [
            serde_json::json!("N/A"),
            serde_json::json!(true),
            serde_json::json!(1e30),
            serde_json::json!([1, 2]),
        ] {
            let row = serde_json::json!({
                "applicantId": "007-99007-00",
                "applicantName": "Paradise Irrigation District",
                "federalShareObligated": amount,
                "damageCategoryCode": "F"
            });
            let r: GrantRecord = serde_json::from_value(row).unwrap();
            assert_eq!(r.applicant_id, "007-99007-00");
            assert_eq!(r.federal_share_obligated, Money::ZERO, "amount {amount}");
        }
    }

    #[test]
    fn test_amount_forms() {
        for (amount, cents) in [
            (serde_json::json!(12), 1_200),
            (serde_json::json!(-12.25), -1_225),
            (serde_json::json!("350.50"), 35_050),
            (serde_json::json!(null), 0),
        ] {
            let row = serde_json::json!({ "federalShareObligated": amount });
            let r: GrantRecord = serde_json::from_value(row).unwrap();
            assert_eq!(r.federal_share_obligated, Money::from_cents(cents));
        }
    }

    #[test]
    fn test_serialized_fields_match_export_columns() {
        let value = serde_json::to_value(GrantRecord::default()).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        let mut expected = PROJECT_COLUMNS.to_vec();
        expected.sort_unstable();
        let mut keys_sorted = keys.clone();
        keys_sorted.sort_unstable();
        assert_eq!(keys_sorted, expected);
    }

    #[test]
    fn test_category_is_normalised() {
        let r = GrantRecord {
            damage_category_code: " f ".to_string(),
            ..Default::default()
        };
        assert_eq!(r.category(), "F");
    }
}
