use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{QaqcError, Result};
use crate::models::Variable;
use crate::processors::HumiditySource;

/// The temperature series corrected together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemperaturePair {
    MaxMin,
    MinDew,
}

impl TemperaturePair {
    pub fn variables(self) -> [Variable; 2] {
        match self {
            TemperaturePair::MaxMin => [Variable::TMax, Variable::TMin],
            TemperaturePair::MinDew => [Variable::TMin, Variable::TDew],
        }
    }
}

/// What a correction pass edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CorrectionTarget {
    Temperature(TemperaturePair),
    Wind,
    SolarRadiation,
    Humidity,
    Precipitation,
}

impl CorrectionTarget {
    /// Observed series edited by a pass on this target. Humidity edits
    /// whichever measurement the station's humidity comes from.
    pub fn variables(self, humidity: HumiditySource) -> Vec<Variable> {
        match self {
            CorrectionTarget::Temperature(pair) => pair.variables().to_vec(),
            CorrectionTarget::Wind => vec![Variable::WindSpeed],
            CorrectionTarget::SolarRadiation => vec![Variable::Rs],
            CorrectionTarget::Humidity => humidity.variables().to_vec(),
            CorrectionTarget::Precipitation => vec![Variable::Precip],
        }
    }

    /// Target a single edited variable belongs to. Mean temperature and
    /// derived columns are not corrected directly.
    pub fn for_variable(variable: Variable) -> Option<Self> {
        match variable {
            Variable::TMax | Variable::TMin => Some(CorrectionTarget::Temperature(TemperaturePair::MaxMin)),
            Variable::TDew => Some(CorrectionTarget::Temperature(TemperaturePair::MinDew)),
            Variable::VaporPressure | Variable::RhAvg | Variable::RhMax | Variable::RhMin => {
                Some(CorrectionTarget::Humidity)
            }
            Variable::Rs => Some(CorrectionTarget::SolarRadiation),
            Variable::WindSpeed => Some(CorrectionTarget::Wind),
            Variable::Precip => Some(CorrectionTarget::Precipitation),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CorrectionTarget::Temperature(TemperaturePair::MaxMin) => "temperature (TMax/TMin)",
            CorrectionTarget::Temperature(TemperaturePair::MinDew) => "temperature (TMin/TDew)",
            CorrectionTarget::Wind => "wind speed",
            CorrectionTarget::SolarRadiation => "solar radiation",
            CorrectionTarget::Humidity => "humidity",
            CorrectionTarget::Precipitation => "precipitation",
        }
    }
}

impl std::fmt::Display for CorrectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One series handed to a [`Corrector`].
#[derive(Debug, Clone, Copy)]
pub struct CorrectionRequest<'a> {
    pub target: CorrectionTarget,
    pub variable: Variable,
    pub values: &'a [f64],
    pub dates: &'a [NaiveDate],
    /// The other series of a correction pair, as currently observed.
    pub companion: Option<(Variable, &'a [f64])>,
}

/// Produces a corrected version of a primary series.
///
/// The returned series must have the same length as `request.values` and may
/// not be missing where the input had a value.
pub trait Corrector {
    fn correct(&mut self, request: &CorrectionRequest<'_>) -> Result<Vec<f64>>;
}

impl<F> Corrector for F
where
    F: FnMut(&CorrectionRequest<'_>) -> Result<Vec<f64>>,
{
    fn correct(&mut self, request: &CorrectionRequest<'_>) -> Result<Vec<f64>> {
        self(request)
    }
}

/// Checks a corrected series against the corrector contract.
pub fn check_contract(variable: Variable, before: &[f64], after: &[f64]) -> Result<()> {
    if before.len() != after.len() {
        return Err(QaqcError::LengthMismatch {
            expected: before.len(),
            actual: after.len(),
        });
    }
    if let Some(day_index) = before
        .iter()
        .zip(after)
        .position(|(b, a)| !b.is_nan() && a.is_nan())
    {
        return Err(QaqcError::CorrectionContract { variable, day_index });
    }
    Ok(())
}

/// A single scripted edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEdit {
    pub date: NaiveDate,
    pub variable: Variable,
    pub value: f64,
}

/// Corrector that applies edits read from a corrections file.
#[derive(Debug, Clone, Default)]
pub struct PresetCorrector {
    edits: BTreeMap<Variable, BTreeMap<NaiveDate, f64>>,
    applied: BTreeSet<(Variable, NaiveDate)>,
}

impl PresetCorrector {
    pub fn new(edits: &[CorrectionEdit]) -> Result<Self> {
        let mut by_variable: BTreeMap<Variable, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
        for edit in edits {
            if CorrectionTarget::for_variable(edit.variable).is_none() {
                return Err(QaqcError::InvalidFormat(format!(
                    "{} cannot be corrected directly",
                    edit.variable
                )));
            }
            if edit.value.is_nan() {
                return Err(QaqcError::CorrectionContract {
                    variable: edit.variable,
                    day_index: 0,
                });
            }
            by_variable
                .entry(edit.variable)
                .or_default()
                .insert(edit.date, edit.value);
        }
        Ok(Self {
            edits: by_variable,
            applied: BTreeSet::new(),
        })
    }

    /// Targets needing a pass, in cascade-table order.
    pub fn targets(&self) -> Vec<CorrectionTarget> {
        let mut targets: Vec<CorrectionTarget> = self
            .edits
            .keys()
            .filter_map(|v| CorrectionTarget::for_variable(*v))
            .collect();
        targets.sort();
        targets.dedup();
        targets
    }

    pub fn edit_count(&self) -> usize {
        self.edits.values().map(|days| days.len()).sum()
    }

    /// Distinct edits written into a series so far.
    pub fn applied(&self) -> usize {
        self.applied.len()
    }

    /// Edits no pass has used yet, such as a humidity series the station's
    /// humidity does not come from.
    pub fn pending(&self) -> usize {
        self.edit_count() - self.applied()
    }
}

impl Corrector for PresetCorrector {
    fn correct(&mut self, request: &CorrectionRequest<'_>) -> Result<Vec<f64>> {
        let mut values = request.values.to_vec();
        let Some(edits) = self.edits.get(&request.variable) else {
            return Ok(values);
        };

        let first = request.dates.first().copied();
        for (date, value) in edits {
            match first.and_then(|start| usize::try_from((*date - start).num_days()).ok()) {
                Some(day) if day < values.len() && request.dates[day] == *date => {
                    debug!(variable = %request.variable, %date, from = values[day], to = *value, "Applying edit");
                    values[day] = *value;
                    self.applied.insert((request.variable, *date));
                }
                _ => warn!(variable = %request.variable, %date, "Edit outside the record period, skipped"),
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n).map(|d| NaiveDate::from_ymd_opt(2020, 6, d).unwrap()).collect()
    }

    #[test]
    fn test_contract() {
        assert!(check_contract(Variable::TMax, &[1.0, f64::NAN], &[2.0, 3.0]).is_ok());
        assert!(matches!(
            check_contract(Variable::TMax, &[1.0, 2.0], &[1.0, f64::NAN]),
            Err(QaqcError::CorrectionContract { day_index: 1, .. })
        ));
        assert!(matches!(
            check_contract(Variable::TMax, &[1.0, 2.0], &[1.0]),
            Err(QaqcError::LengthMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_target_mapping() {
        assert_eq!(
            CorrectionTarget::for_variable(Variable::TMin),
            Some(CorrectionTarget::Temperature(TemperaturePair::MaxMin))
        );
        assert_eq!(
            CorrectionTarget::for_variable(Variable::RhMax),
            Some(CorrectionTarget::Humidity)
        );
        assert_eq!(CorrectionTarget::for_variable(Variable::Eto), None);
        assert_eq!(
            CorrectionTarget::Humidity.variables(HumiditySource::RelativeHumidityExtremes),
            vec![Variable::RhMax, Variable::RhMin]
        );
    }

    #[test]
    fn test_preset_applies_matching_edits() {
        let days = dates(3);
        let edits = [
            CorrectionEdit {
                date: days[1],
                variable: Variable::TMax,
                value: 25.0,
            },
            CorrectionEdit {
                date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                variable: Variable::TMax,
                value: 1.0,
            },
            CorrectionEdit {
                date: days[0],
                variable: Variable::Precip,
                value: 0.0,
            },
        ];
        let mut preset = PresetCorrector::new(&edits).unwrap();
        assert_eq!(preset.edit_count(), 3);
        assert_eq!(
            preset.targets(),
            vec![
                CorrectionTarget::Temperature(TemperaturePair::MaxMin),
                CorrectionTarget::Precipitation
            ]
        );

        let values = [30.0, 31.0, 32.0];
        let corrected = preset
            .correct(&CorrectionRequest {
                target: CorrectionTarget::Temperature(TemperaturePair::MaxMin),
                variable: Variable::TMax,
                values: &values,
                dates: &days,
                companion: None,
            })
            .unwrap();

        assert_eq!(corrected, vec![30.0, 25.0, 32.0]);
        assert_eq!(preset.applied(), 1);
        assert_eq!(preset.pending(), 2);
    }

    #[test]
    fn test_preset_rejects_missing_and_derived_edits() {
        let date = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        let missing = CorrectionEdit {
            date,
            variable: Variable::Rs,
            value: f64::NAN,
        };
        assert!(matches!(
            PresetCorrector::new(&[missing]),
            Err(QaqcError::CorrectionContract { .. })
        ));

        let derived = CorrectionEdit {
            date,
            variable: Variable::Eto,
            value: 3.0,
        };
        assert!(matches!(
            PresetCorrector::new(&[derived]),
            Err(QaqcError::InvalidFormat(_))
        ));
    }

    fn halve(request: &CorrectionRequest<'_>) -> Result<Vec<f64>> {
        Ok(request.values.iter().map(|v| v / 2.0).collect())
    }

    #[test]
    fn test_function_corrector() {
        let mut halve = halve;
        let days = dates(2);
        let out = halve
            .correct(&CorrectionRequest {
                target: CorrectionTarget::Wind,
                variable: Variable::WindSpeed,
                values: &[4.0, 3.0],
                dates: &days,
                companion: None,
            })
            .unwrap();
        assert_eq!(out, vec![2.0, 1.5]);
    }
}
