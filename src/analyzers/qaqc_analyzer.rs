use crate::models::{ClimatologySeries, MonthlyClimatology, Variable, VariableStore};
use crate::processors::{CorrectionTarget, HumiditySource};
use chrono::NaiveDate;
use serde::Serialize;

const DAYS_IN_MONTH: [f64; 12] = [31.0, 28.0, 31.0, 30.0, 31.0, 30.0, 31.0, 31.0, 30.0, 31.0, 30.0, 31.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableCompleteness {
    pub variable: Variable,
    /// Missing days in the original snapshot.
    pub missing_before: usize,
    /// Missing days in the corrected table.
    pub missing_after: usize,
}

/// Outcome of one station run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaqcSummary {
    pub station: String,
    pub total_days: usize,
    pub years: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub humidity_source: Option<String>,
    pub completeness: Vec<VariableCompleteness>,
    pub filled_vapor_pressure: usize,
    pub filled_dewpoint: usize,
    pub corrections: Vec<String>,
    /// Annual totals built from the monthly climatology, mm.
    pub annual_eto: f64,
    pub annual_etr: f64,
}

pub struct QaqcAnalyzer;

impl QaqcAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        station: &str,
        store: &VariableStore,
        humidity_source: Option<HumiditySource>,
        corrections: &[CorrectionTarget],
    ) -> QaqcSummary {
        let missing = |values: &[f64]| values.iter().filter(|v| v.is_nan()).count();

        let completeness = Variable::ALL
            .iter()
            .map(|&variable| VariableCompleteness {
                variable,
                missing_before: missing(store.original(variable)),
                missing_after: missing(store.current(variable)),
            })
            .collect();

        let climatology = store.climatology();

        QaqcSummary {
            station: station.to_string(),
            total_days: store.len(),
            years: store.year_count(),
            date_range: store.date_range(),
            humidity_source: humidity_source.map(|s| s.to_string()),
            completeness,
            filled_vapor_pressure: store.fill_mask().count(Variable::VaporPressure),
            filled_dewpoint: store.fill_mask().count(Variable::TDew),
            corrections: corrections.iter().map(|c| c.to_string()).collect(),
            annual_eto: annual_total(&climatology.get(ClimatologySeries::Eto)),
            annual_etr: annual_total(&climatology.get(ClimatologySeries::Etr)),
        }
    }
}

impl Default for QaqcAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Sum of monthly mean daily values times the days in each month; NaN when
/// any month has no data.
pub fn annual_total(climatology: &MonthlyClimatology) -> f64 {
    climatology
        .values()
        .iter()
        .zip(DAYS_IN_MONTH)
        .map(|(mean, days)| mean * days)
        .sum()
}

impl QaqcSummary {
    pub fn summary(&self) -> String {
        let range = match self.date_range {
            Some((start, end)) => format!("{} to {} ({} years)", start, end, self.years),
            None => "empty".to_string(),
        };
        let annual = |total: f64| {
            if total.is_nan() {
                "incomplete climatology".to_string()
            } else {
                format!("{:.0} mm", total)
            }
        };

        format!(
            "Station: {}\n\
            Date Range: {}\n\
            Days: {}\n\
            Humidity Source: {}\n\
            Filled: {} vapor pressure, {} dewpoint\n\
            Corrections: {}\n\
            Mean Annual ETo: {}\n\
            Mean Annual ETr: {}",
            self.station,
            range,
            self.total_days,
            self.humidity_source.as_deref().unwrap_or("none"),
            self.filled_vapor_pressure,
            self.filled_dewpoint,
            if self.corrections.is_empty() {
                "none".to_string()
            } else {
                self.corrections.join(", ")
            },
            annual(self.annual_eto),
            annual(self.annual_etr),
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut out = format!("{}\n\nMissing Days (original -> corrected):", self.summary());
        for entry in &self.completeness {
            out.push_str(&format!(
                "\n- {:<18} {:>6} -> {:>6}",
                entry.variable.label(),
                entry.missing_before,
                entry.missing_after
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyRecord;

    #[test]
    fn test_annual_total() {
        assert_eq!(annual_total(&MonthlyClimatology::new([1.0; 12])), 365.0);

        let mut means = [1.0; 12];
        means[5] = f64::NAN;
        assert!(annual_total(&MonthlyClimatology::new(means)).is_nan());
    }

    #[test]
    fn test_analyze_counts_missing() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let records: Vec<DailyRecord> = (0..3)
            .map(|i| {
                let mut r = DailyRecord::missing(start + chrono::Duration::days(i));
                r.tmax = if i == 1 { f64::NAN } else { 5.0 };
                r
            })
            .collect();
        let store = VariableStore::from_records(&records).unwrap();

        let summary = QaqcAnalyzer::new().analyze(
            "Test",
            &store,
            Some(HumiditySource::Dewpoint),
            &[CorrectionTarget::Wind],
        );

        let tmax = &summary.completeness[Variable::TMax.index()];
        assert_eq!(tmax.missing_before, 1);
        assert_eq!(tmax.missing_after, 1);
        assert_eq!(summary.total_days, 3);
        assert_eq!(summary.corrections, vec!["wind speed".to_string()]);

        let text = summary.detailed_summary();
        assert!(text.contains("Humidity Source: dewpoint temperature"));
        assert!(text.contains("Mean Annual ETo: incomplete climatology"));
    }
}
