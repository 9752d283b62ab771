//! CSV writer for a finished series.
//!
//! Each row contains the sample's calendar date and its value. The file is
//! written whole, once, after the sweep; a failed target never creates one.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::sample::{ParsedSample, Series};

/// Formats one row as `YYYY-MM-DD,<value>`.
fn format_row(sample: &ParsedSample) -> String {
    let date = sample
        .date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| sample.timestamp.to_string());
    format!("{},{:?}", date, sample.value)
}

/// Writes `series` to `path` with a `date,<metric_column>` header, creating
/// parent directories as needed.
pub fn write_series(path: &Path, metric_column: &str, series: &Series) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file = File::create(path).context("Failed to create CSV file")?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "date,{}", metric_column).context("Failed to write CSV header")?;
    for sample in series.samples() {
        writeln!(writer, "{}", format_row(sample)).context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV file")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{SampleAggregator, date_to_epoch_millis};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample(y: i32, m: u32, d: u32, value: f64) -> ParsedSample {
        ParsedSample {
            timestamp: date_to_epoch_millis(NaiveDate::from_ymd_opt(y, m, d).unwrap()),
            value,
        }
    }

    #[test]
    fn test_format_row() {
        assert_eq!(format_row(&sample(2024, 3, 15, 450200.0)), "2024-03-15,450200.0");
        assert_eq!(format_row(&sample(2024, 3, 16, 1234.56)), "2024-03-16,1234.56");
    }

    #[test]
    fn test_write_series_sorted_with_header() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("out").join("bitcoin_transactions.csv");

        let mut agg = SampleAggregator::new();
        agg.push(sample(2024, 3, 16, 12000.0));
        agg.push(sample(2024, 3, 15, 450200.0));
        agg.push(sample(2024, 3, 16, 12000.0));

        write_series(&csv_path, "transactions", &agg.finalize()).unwrap();

        let content = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(
            lines,
            [
                "date,transactions",
                "2024-03-15,450200.0",
                "2024-03-16,12000.0"
            ]
        );
    }

    #[test]
    fn test_write_series_overwrites_previous_run() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("test.csv");
        std::fs::write(&csv_path, "stale,data\n1,2\n3,4\n").unwrap();

        let mut agg = SampleAggregator::new();
        agg.push(sample(2024, 1, 1, 1.0));
        write_series(&csv_path, "transactions", &agg.finalize()).unwrap();

        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("date,transactions"));
    }
}
