//! CSV export of raw intake history.

use crate::units::{format_value, from_canonical};
use crate::{IntakeRecord, Result, UnitMode};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    date: String,
    day: String,
    amount_cups: f64,
    amount: String,
    unit: &'static str,
}

impl CsvRow {
    fn new(record: &IntakeRecord, unit: UnitMode) -> Self {
        CsvRow {
            id: record.id().to_string(),
            date: record.date().to_rfc3339(),
            day: record.normalized_date().to_string(),
            amount_cups: record.amount_cups(),
            amount: format_value(from_canonical(record.amount_cups(), unit)),
            unit: unit.label(),
        }
    }
}

/// Append `records` to a CSV file, writing headers if the file is new.
///
/// The file is synced before returning. Returns the number of rows written.
pub fn write_history_csv(records: &[IntakeRecord], unit: UnitMode, path: &Path) -> Result<usize> {
    if records.is_empty() {
        tracing::info!("No records to export");
        return Ok(0);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in records {
        writer.serialize(CsvRow::new(record, unit))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} records to {:?}", records.len(), path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn record(day: u32, cups: f64) -> IntakeRecord {
        IntakeRecord::with_amount(Local.with_ymd_and_hms(2025, 11, day, 12, 0, 0).unwrap(), cups)
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("history.csv");

        let count =
            write_history_csv(&[record(15, 1.5), record(14, 8.0)], UnitMode::Oz, &path).unwrap();
        assert_eq!(count, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["id", "date", "day", "amount_cups", "amount", "unit"]
        );

        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "2025-11-15");
        assert_eq!(&rows[0][4], "12");
        assert_eq!(&rows[1][5], "oz");
    }

    #[test]
    fn test_export_appends_without_second_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.csv");

        write_history_csv(&[record(13, 2.0)], UnitMode::Cups, &path).unwrap();
        write_history_csv(&[record(14, 3.0)], UnitMode::Cups, &path).unwrap();

        let reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.into_records().count(), 2);
    }

    #[test]
    fn test_export_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.csv");

        assert_eq!(write_history_csv(&[], UnitMode::Cups, &path).unwrap(), 0);
        assert!(!path.exists());
    }
}
