use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Variable;

/// One day of primary observations. Missing values are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub tavg: f64,
    pub tmax: f64,
    pub tmin: f64,
    pub tdew: f64,
    pub ea: f64,
    pub rhavg: f64,
    pub rhmax: f64,
    pub rhmin: f64,
    pub rs: f64,
    pub wind: f64,
    pub precip: f64,
}

impl DailyRecord {
    /// A record with every observation missing.
    pub fn missing(date: NaiveDate) -> Self {
        Self {
            date,
            tavg: f64::NAN,
            tmax: f64::NAN,
            tmin: f64::NAN,
            tdew: f64::NAN,
            ea: f64::NAN,
            rhavg: f64::NAN,
            rhmax: f64::NAN,
            rhmin: f64::NAN,
            rs: f64::NAN,
            wind: f64::NAN,
            precip: f64::NAN,
        }
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Value of a primary variable; derived variables are never observed.
    pub fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::TAvg => self.tavg,
            Variable::TMax => self.tmax,
            Variable::TMin => self.tmin,
            Variable::TDew => self.tdew,
            Variable::VaporPressure => self.ea,
            Variable::RhAvg => self.rhavg,
            Variable::RhMax => self.rhmax,
            Variable::RhMin => self.rhmin,
            Variable::Rs => self.rs,
            Variable::WindSpeed => self.wind,
            Variable::Precip => self.precip,
            _ => f64::NAN,
        }
    }

    pub fn set(&mut self, variable: Variable, value: f64) {
        match variable {
            Variable::TAvg => self.tavg = value,
            Variable::TMax => self.tmax = value,
            Variable::TMin => self.tmin = value,
            Variable::TDew => self.tdew = value,
            Variable::VaporPressure => self.ea = value,
            Variable::RhAvg => self.rhavg = value,
            Variable::RhMax => self.rhmax = value,
            Variable::RhMin => self.rhmin = value,
            Variable::Rs => self.rs = value,
            Variable::WindSpeed => self.wind = value,
            Variable::Precip => self.precip = value,
            _ => {}
        }
    }
}

/// One row of an output table: date parts followed by the sixteen fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub values: [f64; Variable::COUNT],
}

impl TableRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            values: [f64::NAN; Variable::COUNT],
        }
    }

    pub fn get(&self, variable: Variable) -> f64 {
        self.values[variable.index()]
    }
}

/// A per-day table sharing the fixed output column set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTable {
    pub rows: Vec<TableRow>,
}

impl DailyTable {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, variable: Variable) -> Vec<f64> {
        self.rows.iter().map(|r| r.get(variable)).collect()
    }

    pub fn column_names() -> Vec<&'static str> {
        let mut names = vec!["year", "month", "day"];
        names.extend(Variable::ALL.iter().map(|v| v.label()));
        names
    }
}

/// The three parallel tables handed to the report writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputTables {
    pub corrected: DailyTable,
    pub delta: DailyTable,
    pub fill: DailyTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let record = DailyRecord::missing(date);
        assert!(Variable::PRIMARY.iter().all(|v| record.get(*v).is_nan()));
        assert_eq!(record.month(), 3);
    }

    #[test]
    fn test_get_set_primary() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let mut record = DailyRecord::missing(date);
        record.set(Variable::TMax, 21.5);
        record.set(Variable::Eto, 4.0); // derived, ignored

        assert_eq!(record.get(Variable::TMax), 21.5);
        assert!(record.get(Variable::Eto).is_nan());
        assert_eq!(
            Variable::PRIMARY.iter().filter(|v| record.get(**v).is_nan()).count(),
            Variable::PRIMARY.len() - 1
        );
    }

    #[test]
    fn test_table_row_date_parts() {
        let row = TableRow::new(NaiveDate::from_ymd_opt(2019, 12, 31).unwrap());
        assert_eq!((row.year, row.month, row.day), (2019, 12, 31));
        assert!(row.get(Variable::TAvg).is_nan());
        assert_eq!(DailyTable::column_names().len(), 3 + Variable::COUNT);
    }
}
