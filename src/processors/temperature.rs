use crate::error::{QaqcError, Result};
use crate::models::{ClimatologySeries, MonthlyClimatology};
use crate::processors::MonthlyAggregator;

/// Daily temperature differences.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureDeltas {
    /// Tmax - Tmin
    pub delta_t: Vec<f64>,
    /// Tmin - Tdew
    pub tmin_minus_tdew: Vec<f64>,
}

pub struct TemperatureSecondary;

impl TemperatureSecondary {
    pub fn compute(tmax: &[f64], tmin: &[f64], tdew: &[f64]) -> Result<TemperatureDeltas> {
        if tmax.len() != tmin.len() || tdew.len() != tmin.len() {
            return Err(QaqcError::LengthMismatch {
                expected: tmin.len(),
                actual: if tmax.len() != tmin.len() { tmax.len() } else { tdew.len() },
            });
        }

        let delta_t = tmax.iter().zip(tmin).map(|(hi, lo)| hi - lo).collect();
        let tmin_minus_tdew = tmin.iter().zip(tdew).map(|(lo, dew)| lo - dew).collect();

        Ok(TemperatureDeltas {
            delta_t,
            tmin_minus_tdew,
        })
    }

    /// Monthly means of the deltas and of Tmin and Tdew themselves.
    pub fn climatologies(
        deltas: &TemperatureDeltas,
        tmin: &[f64],
        tdew: &[f64],
        months: &[u32],
    ) -> [(ClimatologySeries, MonthlyClimatology); 4] {
        [
            (
                ClimatologySeries::DeltaT,
                MonthlyAggregator::aggregate(&deltas.delta_t, months),
            ),
            (
                ClimatologySeries::TMinMinusTDew,
                MonthlyAggregator::aggregate(&deltas.tmin_minus_tdew, months),
            ),
            (ClimatologySeries::TMin, MonthlyAggregator::aggregate(tmin, months)),
            (ClimatologySeries::TDew, MonthlyAggregator::aggregate(tdew, months)),
        ]
    }
}
