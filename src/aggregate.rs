//! Per-applicant aggregation.

use std::collections::HashMap;

use crate::types::{GrantRecord, Money, UtilitySummary};

/// Group records by applicantId.
///
/// Sorted by total obligated amount, largest first; equal totals by
/// applicantId ascending. Name and state come from the first record seen
/// for the applicant.
pub fn summarize(records: &[GrantRecord]) -> Vec<UtilitySummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<UtilitySummary> = Vec::new();

    for r in records {
        let slot = *index.entry(r.applicant_id.as_str()).or_insert_with(|| {
            summaries.push(UtilitySummary {
                applicant_id: r.applicant_id.clone(),
                applicant_name: r.applicant_name.clone(),
                state: r.state.clone(),
                total_federal_share_obligated: Money::ZERO,
                project_count: 0,
                first_date_obligated: None,
                last_date_obligated: None,
            });
            summaries.len() - 1
        });

        let s = &mut summaries[slot];
        s.total_federal_share_obligated += r.federal_share_obligated;
        s.project_count += 1;
        if let Some(d) = r.date_obligated {
            s.first_date_obligated = Some(s.first_date_obligated.map_or(d, |f| f.min(d)));
            s.last_date_obligated = Some(s.last_date_obligated.map_or(d, |l| l.max(d)));
        }
    }

    summaries.sort_by(|a, b| {
        b.total_federal_share_obligated
            .cmp(&a.total_federal_share_obligated)
            .then_with(|| a.applicant_id.cmp(&b.applicant_id))
    });
    summaries
}

/// The first `n` summaries (already ordered by total).
pub fn top(summaries: &[UtilitySummary], n: usize) -> &[UtilitySummary] {
    &summaries[..n.min(summaries.len())]
}

/// Sum of federalShareObligated across records.
pub fn grand_total(records: &[GrantRecord]) -> Money {
    records.iter().map(|r| r.federal_share_obligated).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, cents: i64, date: Option<(i32, u32, u32)>) -> GrantRecord {
        GrantRecord {
            state: "CA".to_string(),
            applicant_id: id.to_string(),
            applicant_name: format!("{id} Water District"),
            federal_share_obligated: Money::from_cents(cents),
            date_obligated: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            damage_category_code: "F".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_two_records_same_applicant() {
        let records = vec![record("X", 10_000, None), record("X", 25_050, None)];
        let summaries = summarize(&records);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].applicant_id, "X");
        assert_eq!(summaries[0].total_federal_share_obligated.to_string(), "350.50");
        assert_eq!(summaries[0].project_count, 2);
    }

    #[test]
    fn test_totals_add_up_to_grand_total() {
        let records = vec![
            record("A", 123_456, None),
            record("B", -5_000, None),
            record("A", 1, None),
            record("C", 99_999_999, None),
            record("B", 77_777, None),
        ];
        let summaries = summarize(&records);
        let summed: Money = summaries.iter().map(|s| s.total_federal_share_obligated).sum();
        assert_eq!(summed, grand_total(&records));
        let count: usize = summaries.iter().map(|s| s.project_count).sum();
        assert_eq!(count, records.len());
    }

    #[test]
    fn test_sorted_descending_with_id_tie_break() {
        let records = vec![
            record("B", 500, None),
            record("C", 900, None),
            record("A", 500, None),
        ];
        let ids: Vec<String> = summarize(&records)
            .into_iter()
            .map(|s| s.applicant_id)
            .collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_first_and_last_dates() {
        let records = vec![
            record("X", 1, Some((2021, 5, 1))),
            record("X", 1, None),
            record("X", 1, Some((2019, 2, 3))),
            record("X", 1, Some((2020, 1, 1))),
        ];
        let s = &summarize(&records)[0];
        assert_eq!(s.first_date_obligated, NaiveDate::from_ymd_opt(2019, 2, 3));
        assert_eq!(s.last_date_obligated, NaiveDate::from_ymd_opt(2021, 5, 1));
    }

    #[test]
    fn test_empty_input() {
        assert!(summarize(&[]).is_empty());
        assert_eq!(grand_total(&[]), Money::ZERO);
    }

    #[test]
    fn test_top_clamps() {
        let records = vec![record("A", 1, None), record("B", 2, None)];
        let summaries = summarize(&records);
        assert_eq!(top(&summaries, 20).len(), 2);
        assert_eq!(top(&summaries, 1)[0].applicant_id, "B");
    }
}
