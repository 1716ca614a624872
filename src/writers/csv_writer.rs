use crate::error::Result;
use crate::models::{ClimatologySeries, ClimatologyTable, DailyTable};
use crate::utils::constants::DEFAULT_MISSING_VALUE;
use std::path::Path;
use tracing::debug;

/// Writes tables as CSV with the display labels as headers, for spreadsheet
/// use. Missing values are written as the station's sentinel.
pub struct CsvTableWriter {
    missing_value: f64,
}

impl CsvTableWriter {
    pub fn new() -> Self {
        Self {
            missing_value: DEFAULT_MISSING_VALUE,
        }
    }

    pub fn with_missing_value(mut self, missing_value: f64) -> Self {
        self.missing_value = missing_value;
        self
    }

    fn format(&self, value: f64) -> String {
        if value.is_nan() {
            self.missing_value.to_string()
        } else {
            value.to_string()
        }
    }

    pub fn write_daily_table(&self, table: &DailyTable, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(DailyTable::column_names())?;

        for row in &table.rows {
            let mut record = vec![row.year.to_string(), row.month.to_string(), row.day.to_string()];
            record.extend(row.values.iter().map(|v| self.format(*v)));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        debug!(path = %path.display(), rows = table.len(), "Wrote CSV file");
        Ok(())
    }

    pub fn write_climatology(&self, table: &ClimatologyTable, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec!["Month"];
        header.extend(ClimatologySeries::ALL.iter().map(|s| s.label()));
        writer.write_record(&header)?;

        for month in 1..=12u32 {
            let mut record = vec![month.to_string()];
            record.extend(
                ClimatologySeries::ALL
                    .iter()
                    .map(|s| self.format(table.get(*s).get(month))),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for CsvTableWriter {
    fn default() -> Self {
        Self::new()
    }
}
