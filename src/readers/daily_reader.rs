use crate::error::{QaqcError, Result};
use crate::models::{DailyRecord, Variable};
use crate::utils::constants::DEFAULT_MISSING_VALUE;
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// How the date of a row is spelled in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateColumns {
    Single(usize),
    Parts { year: usize, month: usize, day: usize },
}

/// Reads daily station observations from a comma-separated file.
///
/// The header names the columns: either a `date` column (`YYYY-MM-DD`) or
/// `year`, `month` and `day`, plus any of the primary variable keys (`tavg`,
/// `tmax`, `tmin`, `tdew`, `ea`, `rhavg`, `rhmax`, `rhmin`, `rs`, `ws`,
/// `precip`). Absent variables are entirely missing.
pub struct DailyReader {
    missing_value: f64,
}

impl DailyReader {
    pub fn new() -> Self {
        Self {
            missing_value: DEFAULT_MISSING_VALUE,
        }
    }

    pub fn with_missing_value(mut self, missing_value: f64) -> Self {
        self.missing_value = missing_value;
        self
    }

    /// Records in ascending date order with no gaps. Days absent from the file
    /// are inserted as all-missing records.
    pub fn read_records(&self, path: &Path) -> Result<Vec<DailyRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let dates = Self::date_columns(&headers)?;
        let columns = Self::variable_columns(&headers);

        let found: Vec<&str> = columns.iter().map(|(_, v)| v.key()).collect();
        debug!(path = %path.display(), columns = ?found, "Reading daily observations");

        let mut by_date: BTreeMap<NaiveDate, DailyRecord> = BTreeMap::new();
        for (line, row) in reader.records().enumerate() {
            let row = row?;
            if row.iter().all(|field| field.is_empty()) {
                continue;
            }

            let date = Self::parse_date(&row, dates, line + 2)?;
            let mut record = DailyRecord::missing(date);
            for &(index, variable) in &columns {
                record.set(variable, self.parse_value(row.get(index).unwrap_or(""), variable, line + 2)?);
            }

            if by_date.insert(date, record).is_some() {
                return Err(QaqcError::InvalidFormat(format!(
                    "Duplicate date {} on line {}",
                    date,
                    line + 2
                )));
            }
        }

        let records = Self::fill_calendar_gaps(by_date);
        info!(path = %path.display(), days = records.len(), "Loaded daily observations");
        Ok(records)
    }

    fn date_columns(headers: &StringRecord) -> Result<DateColumns> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        if let Some(index) = find("date") {
            return Ok(DateColumns::Single(index));
        }
        match (find("year"), find("month"), find("day")) {
            (Some(year), Some(month), Some(day)) => Ok(DateColumns::Parts { year, month, day }),
            _ => Err(QaqcError::InvalidFormat(
                "Input needs a 'date' column or 'year', 'month' and 'day' columns".to_string(),
            )),
        }
    }

    fn variable_columns(headers: &StringRecord) -> Vec<(usize, Variable)> {
        headers
            .iter()
            .enumerate()
            .filter_map(|(index, header)| match Variable::from_key(header) {
                Some(variable) if variable.is_primary() => Some((index, variable)),
                Some(variable) => {
                    warn!(column = header, "Ignoring derived column {}; it is recomputed", variable);
                    None
                }
                None => None,
            })
            .collect()
    }

    fn parse_date(row: &StringRecord, columns: DateColumns, line: usize) -> Result<NaiveDate> {
        let field = |index: usize| row.get(index).unwrap_or("");
        match columns {
            DateColumns::Single(index) => Ok(NaiveDate::parse_from_str(field(index), "%Y-%m-%d")?),
            DateColumns::Parts { year, month, day } => {
                let part = |index: usize| -> Result<u32> {
                    field(index).parse::<u32>().map_err(|_| {
                        QaqcError::InvalidFormat(format!(
                            "Invalid date component '{}' on line {}",
                            field(index),
                            line
                        ))
                    })
                };
                let (y, m, d) = (part(year)?, part(month)?, part(day)?);
                NaiveDate::from_ymd_opt(y as i32, m, d).ok_or_else(|| {
                    QaqcError::InvalidFormat(format!("Invalid date {}-{}-{} on line {}", y, m, d, line))
                })
            }
        }
    }

    /// Empty cells, the sentinel and NaN all mean missing.
    fn parse_value(&self, field: &str, variable: Variable, line: usize) -> Result<f64> {
        if field.is_empty() {
            return Ok(f64::NAN);
        }
        let value = field.parse::<f64>().map_err(|_| {
            QaqcError::InvalidFormat(format!(
                "Invalid {} value '{}' on line {}",
                variable.key(),
                field,
                line
            ))
        })?;
        if value == self.missing_value || value.is_nan() {
            Ok(f64::NAN)
        } else {
            Ok(value)
        }
    }

    fn fill_calendar_gaps(by_date: BTreeMap<NaiveDate, DailyRecord>) -> Vec<DailyRecord> {
        let mut records: Vec<DailyRecord> = Vec::with_capacity(by_date.len());
        let mut inserted = 0usize;

        for (date, record) in by_date {
            if let Some(last) = records.last().map(|r| r.date) {
                let mut next = last.succ_opt();
                while let Some(day) = next.filter(|d| *d < date) {
                    records.push(DailyRecord::missing(day));
                    inserted += 1;
                    next = day.succ_opt();
                }
            }
            records.push(record);
        }

        if inserted > 0 {
            warn!(days = inserted, "Input skipped days; inserted them as missing");
        }
        records
    }
}

impl Default for DailyReader {
    fn default() -> Self {
        Self::new()
    }
}
