use chrono::{Datelike, NaiveDate};

use crate::error::{QaqcError, Result};
use crate::models::{ClimatologyTable, DailyRecord, DailyTable, FillMask, TableRow, Variable};

/// Owns every per-day series of a station run.
///
/// `observed` holds the primary series as ingested and then as corrected. `current`
/// holds what the cascade resolved and derived from them. `original` is the
/// reference snapshot that corrected-minus-original deltas are measured against:
/// raw primary columns, the per-day Ea and Tdew of the first humidity resolution
/// and the derived columns of the first full cascade.
#[derive(Debug, Clone)]
pub struct VariableStore {
    dates: Vec<NaiveDate>,
    months: Vec<u32>,
    observed: Vec<Vec<f64>>,
    current: Vec<Vec<f64>>,
    original: Vec<Vec<f64>>,
    delta_t: Vec<f64>,
    tmin_minus_tdew: Vec<f64>,
    baseline_ea: Vec<f64>,
    baseline_tdew: Vec<f64>,
    fill_mask: FillMask,
    climatology: ClimatologyTable,
}

impl VariableStore {
    /// Build a store from records in ascending, gap-free date order.
    pub fn from_records(records: &[DailyRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(QaqcError::MissingData("no daily records supplied".to_string()));
        }

        for window in records.windows(2) {
            let expected = window[0].date.succ_opt();
            if expected != Some(window[1].date) {
                return Err(QaqcError::InvalidFormat(format!(
                    "daily records must be ascending and gap-free: {} is followed by {}",
                    window[0].date, window[1].date
                )));
            }
        }

        let n = records.len();
        let mut observed = vec![vec![f64::NAN; n]; Variable::COUNT];
        for (day, record) in records.iter().enumerate() {
            for variable in Variable::PRIMARY {
                observed[variable.index()][day] = record.get(variable);
            }
        }

        Ok(Self {
            dates: records.iter().map(|r| r.date).collect(),
            months: records.iter().map(|r| r.month()).collect(),
            current: observed.clone(),
            original: observed.clone(),
            baseline_ea: observed[Variable::VaporPressure.index()].clone(),
            baseline_tdew: observed[Variable::TDew.index()].clone(),
            observed,
            delta_t: vec![f64::NAN; n],
            tmin_minus_tdew: vec![f64::NAN; n],
            fill_mask: FillMask::new(n),
            climatology: ClimatologyTable::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn months(&self) -> &[u32] {
        &self.months
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }

    /// Observed (or corrected) series of a primary variable.
    pub fn observed(&self, variable: Variable) -> &[f64] {
        &self.observed[variable.index()]
    }

    /// Resolved or derived series as of the last completed cascade step.
    pub fn current(&self, variable: Variable) -> &[f64] {
        &self.current[variable.index()]
    }

    pub fn original(&self, variable: Variable) -> &[f64] {
        &self.original[variable.index()]
    }

    /// Replace a primary series with its corrected version.
    ///
    /// The current column is reset to the new observations; resolution of
    /// humidity columns happens in the cascade that follows.
    pub fn set_observed(&mut self, variable: Variable, values: Vec<f64>) -> Result<()> {
        if !variable.is_primary() {
            return Err(QaqcError::InvalidFormat(format!(
                "{} is derived and cannot be replaced by observations",
                variable
            )));
        }
        self.check_len(values.len())?;
        self.current[variable.index()] = values.clone();
        self.observed[variable.index()] = values;
        Ok(())
    }

    pub fn set_current(&mut self, variable: Variable, values: Vec<f64>) -> Result<()> {
        self.check_len(values.len())?;
        self.current[variable.index()] = values;
        Ok(())
    }

    pub fn delta_t(&self) -> &[f64] {
        &self.delta_t
    }

    pub fn tmin_minus_tdew(&self) -> &[f64] {
        &self.tmin_minus_tdew
    }

    pub fn set_temperature_deltas(&mut self, delta_t: Vec<f64>, tmin_minus_tdew: Vec<f64>) -> Result<()> {
        self.check_len(delta_t.len())?;
        self.check_len(tmin_minus_tdew.len())?;
        self.delta_t = delta_t;
        self.tmin_minus_tdew = tmin_minus_tdew;
        Ok(())
    }

    /// Record the Ea and Tdew each day yields on its own, before any
    /// climatology gap-fill.
    pub fn set_humidity_baseline(&mut self, ea: Vec<f64>, tdew: Vec<f64>) -> Result<()> {
        self.check_len(ea.len())?;
        self.check_len(tdew.len())?;
        self.baseline_ea = ea;
        self.baseline_tdew = tdew;
        Ok(())
    }

    pub fn fill_mask(&self) -> &FillMask {
        &self.fill_mask
    }

    pub fn set_fill_mask(&mut self, fill_mask: FillMask) {
        self.fill_mask = fill_mask;
    }

    pub fn climatology(&self) -> &ClimatologyTable {
        &self.climatology
    }

    pub fn climatology_mut(&mut self) -> &mut ClimatologyTable {
        &mut self.climatology
    }

    /// Freeze the reference snapshot: raw primaries, the humidity baseline
    /// and the derived columns of the cascade that has just completed.
    pub fn snapshot_original(&mut self) {
        for variable in Variable::ALL {
            let column = match variable {
                Variable::VaporPressure => &self.baseline_ea,
                Variable::TDew => &self.baseline_tdew,
                v if v.is_primary() => &self.observed[v.index()],
                v => &self.current[v.index()],
            };
            self.original[variable.index()] = column.clone();
        }
    }

    pub fn corrected_table(&self) -> DailyTable {
        self.table_from(&self.current)
    }

    pub fn original_table(&self) -> DailyTable {
        self.table_from(&self.original)
    }

    fn table_from(&self, columns: &[Vec<f64>]) -> DailyTable {
        let rows = self
            .dates
            .iter()
            .enumerate()
            .map(|(day, date)| {
                let mut row = TableRow::new(*date);
                for variable in Variable::ALL {
                    row.values[variable.index()] = columns[variable.index()][day];
                }
                row
            })
            .collect();
        DailyTable::new(rows)
    }

    /// Number of distinct calendar years covered.
    pub fn year_count(&self) -> usize {
        let mut years: Vec<i32> = self.dates.iter().map(|d| d.year()).collect();
        years.dedup();
        years.len()
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual != self.len() {
            return Err(QaqcError::LengthMismatch {
                expected: self.len(),
                actual,
            });
        }
        Ok(())
    }
}
