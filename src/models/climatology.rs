use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Month-of-year means of one series across every year present.
///
/// Always exactly twelve buckets; a bucket with no valid samples holds NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyClimatology {
    means: [f64; 12],
}

impl MonthlyClimatology {
    pub fn new(means: [f64; 12]) -> Self {
        Self { means }
    }

    pub fn missing() -> Self {
        Self {
            means: [f64::NAN; 12],
        }
    }

    /// Mean for a calendar month (1..=12). Out-of-range months yield NaN.
    pub fn get(&self, month: u32) -> f64 {
        match month {
            1..=12 => self.means[(month - 1) as usize],
            _ => f64::NAN,
        }
    }

    pub fn values(&self) -> &[f64; 12] {
        &self.means
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Months whose bucket had no valid samples.
    pub fn missing_months(&self) -> Vec<u32> {
        (1..=12).filter(|&m| self.get(m).is_nan()).collect()
    }

    /// Bitwise equality, treating NaN buckets as equal to each other.
    pub fn same_as(&self, other: &MonthlyClimatology) -> bool {
        self.means
            .iter()
            .zip(other.means.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan()))
    }
}

impl Default for MonthlyClimatology {
    fn default() -> Self {
        Self::missing()
    }
}

/// Named series that receive a monthly climatology during the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClimatologySeries {
    DeltaT,
    TMinMinusTDew,
    TMin,
    TDew,
    Rs,
    RsTr,
    Rso,
    Eto,
    Etr,
    Precip,
}

impl ClimatologySeries {
    pub const ALL: [ClimatologySeries; 10] = [
        ClimatologySeries::DeltaT,
        ClimatologySeries::TMinMinusTDew,
        ClimatologySeries::TMin,
        ClimatologySeries::TDew,
        ClimatologySeries::Rs,
        ClimatologySeries::RsTr,
        ClimatologySeries::Rso,
        ClimatologySeries::Eto,
        ClimatologySeries::Etr,
        ClimatologySeries::Precip,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ClimatologySeries::DeltaT => "MM TMax - TMin (C)",
            ClimatologySeries::TMinMinusTDew => "MM TMin - TDew (C)",
            ClimatologySeries::TMin => "MM TMin (C)",
            ClimatologySeries::TDew => "MM TDew (C)",
            ClimatologySeries::Rs => "MM Rs (w/m2)",
            ClimatologySeries::RsTr => "MM Rs_TR (w/m2)",
            ClimatologySeries::Rso => "MM Rso (w/m2)",
            ClimatologySeries::Eto => "MM ETo (mm)",
            ClimatologySeries::Etr => "MM ETr (mm)",
            ClimatologySeries::Precip => "MM Precip (mm)",
        }
    }

    /// Column name in machine-readable outputs.
    pub fn key(self) -> &'static str {
        match self {
            ClimatologySeries::DeltaT => "mm_delta_t",
            ClimatologySeries::TMinMinusTDew => "mm_tmin_tdew",
            ClimatologySeries::TMin => "mm_tmin",
            ClimatologySeries::TDew => "mm_tdew",
            ClimatologySeries::Rs => "mm_rs",
            ClimatologySeries::RsTr => "mm_rs_tr",
            ClimatologySeries::Rso => "mm_rso",
            ClimatologySeries::Eto => "mm_eto",
            ClimatologySeries::Etr => "mm_etr",
            ClimatologySeries::Precip => "mm_precip",
        }
    }
}

impl fmt::Display for ClimatologySeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Every climatology produced by the latest cascade, keyed by series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimatologyTable {
    entries: BTreeMap<ClimatologySeries, MonthlyClimatology>,
}

impl ClimatologyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: ClimatologySeries, climatology: MonthlyClimatology) {
        self.entries.insert(series, climatology);
    }

    /// Climatology for a series; NaN buckets when it has not been computed yet.
    pub fn get(&self, series: ClimatologySeries) -> MonthlyClimatology {
        self.entries.get(&series).copied().unwrap_or_default()
    }

    pub fn contains(&self, series: ClimatologySeries) -> bool {
        self.entries.contains_key(&series)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClimatologySeries, &MonthlyClimatology)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_calendar_month() {
        let mut means = [0.0; 12];
        means[0] = 5.0;
        means[11] = 7.5;
        let clim = MonthlyClimatology::new(means);

        assert_eq!(clim.get(1), 5.0);
        assert_eq!(clim.get(12), 7.5);
        assert!(clim.get(0).is_nan());
        assert!(clim.get(13).is_nan());
        assert_eq!(clim.len(), 12);
    }

    #[test]
    fn test_missing_months() {
        let mut means = [1.0; 12];
        means[1] = f64::NAN;
        let clim = MonthlyClimatology::new(means);
        assert_eq!(clim.missing_months(), vec![2]);
        assert_eq!(MonthlyClimatology::missing().missing_months().len(), 12);
    }

    #[test]
    fn test_same_as_treats_nan_buckets_equal() {
        let a = MonthlyClimatology::missing();
        let b = MonthlyClimatology::missing();
        assert!(a.same_as(&b));
        assert_ne!(a, b); // PartialEq follows IEEE semantics
    }

    #[test]
    fn test_table_defaults_to_missing() {
        let table = ClimatologyTable::new();
        assert!(!table.contains(ClimatologySeries::Eto));
        assert!(table.get(ClimatologySeries::Eto).get(6).is_nan());
    }
}
