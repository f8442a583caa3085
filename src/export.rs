//! CSV export of project rows and applicant summaries.
//!
//! Both files start with a fixed header row, also when there are no rows.
//! [`read_projects`] parses a project export back into records.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::types::{lenient, GrantRecord, Money, UtilitySummary, PROJECT_COLUMNS, SUMMARY_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column} '{value}'")]
    InvalidField {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Write project rows with the [`PROJECT_COLUMNS`] header.
pub fn write_projects<W: Write>(out: W, records: &[GrantRecord]) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(PROJECT_COLUMNS)?;
    for r in records {
        writer.serialize(r)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write summaries with the [`SUMMARY_COLUMNS`] header.
pub fn write_summaries<W: Write>(out: W, summaries: &[UtilitySummary]) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(SUMMARY_COLUMNS)?;
    for s in summaries {
        writer.write_record([
            s.applicant_id.as_str(),
            s.applicant_name.as_str(),
            &s.total_federal_share_obligated.to_string(),
            &s.project_count.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn projects_csv(records: &[GrantRecord]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_projects(&mut buf, records)?;
    Ok(String::from_utf8(buf)?)
}

pub fn summaries_csv(summaries: &[UtilitySummary]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_summaries(&mut buf, summaries)?;
    Ok(String::from_utf8(buf)?)
}

/// Column positions resolved from a header row.
struct ProjectColumns([usize; PROJECT_COLUMNS.len()]);

impl ProjectColumns {
    fn resolve(headers: &StringRecord) -> Result<Self, ExportError> {
        let mut idx = [0usize; PROJECT_COLUMNS.len()];
        for (slot, name) in idx.iter_mut().zip(PROJECT_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(ExportError::MissingColumn(name))?;
        }
        Ok(Self(idx))
    }

    fn field<'r>(&self, record: &'r StringRecord, column: usize) -> &'r str {
        record.get(self.0[column]).unwrap_or("")
    }
}

fn invalid(row: usize, column: usize, value: &str) -> ExportError {
    ExportError::InvalidField {
        row,
        column: PROJECT_COLUMNS[column],
        value: value.to_string(),
    }
}

/// Parse a project CSV (as written by [`write_projects`]) back into records.
///
/// Columns are matched by header name, so column order does not matter.
/// Row numbers in errors are 1-based and exclude the header.
pub fn read_projects<R: Read>(input: R) -> Result<Vec<GrantRecord>, ExportError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let cols = ProjectColumns::resolve(reader.headers()?)?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        let n = i + 1;
        let text = |c: usize| cols.field(&row, c).to_string();
        let int = |c: usize| -> Result<i64, ExportError> {
            let raw = cols.field(&row, c).trim();
            if raw.is_empty() {
                return Ok(0);
            }
            raw.parse().map_err(|_| invalid(n, c, raw))
        };

        let date_raw = cols.field(&row, 3);
        let date_obligated = if date_raw.trim().is_empty() {
            None
        } else {
            Some(lenient::parse_date(date_raw).ok_or_else(|| invalid(n, 3, date_raw))?)
        };
        let money_raw = cols.field(&row, 4);
        let federal_share_obligated: Money =
            money_raw.parse().map_err(|_| invalid(n, 4, money_raw))?;

        records.push(GrantRecord {
            state: text(0),
            applicant_id: text(1),
            applicant_name: text(2),
            date_obligated,
            federal_share_obligated,
            project_title: text(5),
            pw_number: text(6),
            version_number: int(7)?,
            disaster_number: int(8)?,
            county: text(9),
            damage_category_code: text(10),
        });
    }
    Ok(records)
}
