use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;

use crate::error::{QaqcError, Result};
use crate::models::Station;
use crate::refet::{calcs, AsceStandardized, DailyInput, ReferenceEtFormula, RefetError, Surface};
use crate::utils::constants::W_TO_MJ_PER_DAY;

/// Daily grass and alfalfa reference ET in mm, plus wind adjusted to 2 m.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceEt {
    pub eto: Vec<f64>,
    pub etr: Vec<f64>,
    pub wind_2m: Vec<f64>,
}

/// Per-day series the engine reads. `rs` is in W m-2.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceEtInputs<'a> {
    pub dates: &'a [NaiveDate],
    pub tmin: &'a [f64],
    pub tmax: &'a [f64],
    pub ea: &'a [f64],
    pub rs: &'a [f64],
    pub wind: &'a [f64],
}

pub struct ReferenceETEngine {
    formula: Box<dyn ReferenceEtFormula>,
    latitude: f64,
    elevation: f64,
    anemometer_height: f64,
}

impl ReferenceETEngine {
    pub fn new(station: &Station) -> Self {
        Self::with_formula(station, Box::new(AsceStandardized::new()))
    }

    pub fn with_formula(station: &Station, formula: Box<dyn ReferenceEtFormula>) -> Self {
        Self {
            formula,
            latitude: station.latitude,
            elevation: station.elevation,
            anemometer_height: station.anemometer_height,
        }
    }

    fn day_input(&self, inputs: &ReferenceEtInputs<'_>, day: usize) -> DailyInput {
        DailyInput {
            tmin: inputs.tmin[day],
            tmax: inputs.tmax[day],
            ea: inputs.ea[day],
            rs: inputs.rs[day] * W_TO_MJ_PER_DAY,
            uz: inputs.wind[day],
            zw: self.anemometer_height,
            elev: self.elevation,
            lat: self.latitude,
            doy: inputs.dates[day].ordinal(),
        }
    }

    fn daily(&self, inputs: &ReferenceEtInputs<'_>, day: usize) -> Result<(f64, f64, f64)> {
        let input = self.day_input(inputs, day);
        let in_range = |e: RefetError| match e {
            RefetError::OutOfDomain { parameter, value } => QaqcError::PhysicalRange {
                day_index: day,
                date: inputs.dates[day],
                parameter,
                value,
            },
        };

        let eto = self.formula.daily(&input, Surface::Grass).map_err(in_range)?;
        let etr = self.formula.daily(&input, Surface::Alfalfa).map_err(in_range)?;
        let wind_2m = calcs::wind_height_adjust(input.uz, input.zw);
        Ok((eto, etr, wind_2m))
    }

    pub fn compute(&self, inputs: &ReferenceEtInputs<'_>) -> Result<ReferenceEt> {
        let n = inputs.dates.len();
        for series in [inputs.tmin, inputs.tmax, inputs.ea, inputs.rs, inputs.wind] {
            if series.len() != n {
                return Err(QaqcError::LengthMismatch {
                    expected: n,
                    actual: series.len(),
                });
            }
        }

        let days: Vec<(f64, f64, f64)> = (0..n)
            .into_par_iter()
            .map(|day| self.daily(inputs, day))
            .collect::<Result<_>>()?;

        let mut out = ReferenceEt {
            eto: Vec::with_capacity(n),
            etr: Vec::with_capacity(n),
            wind_2m: Vec::with_capacity(n),
        };
        for (eto, etr, wind_2m) in days {
            out.eto.push(eto);
            out.etr.push(etr);
            out.wind_2m.push(wind_2m);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeley() -> Station {
        Station::new("Greeley".to_string(), 40.41, 1462.4, 3.0).unwrap()
    }

    #[test]
    fn test_engine_converts_radiation_units() {
        let engine = ReferenceETEngine::new(&greeley());
        let dates = [NaiveDate::from_ymd_opt(2021, 7, 2).unwrap()];
        let rs_watts = [27.80 / W_TO_MJ_PER_DAY];

        let out = engine
            .compute(&ReferenceEtInputs {
                dates: &dates,
                tmin: &[12.98],
                tmax: &[32.44],
                ea: &[1.26],
                rs: &rs_watts,
                wind: &[1.94],
            })
            .unwrap();

        assert!((out.eto[0] - 6.42).abs() < 0.05, "eto = {}", out.eto[0]);
        assert!((out.etr[0] - 8.08).abs() < 0.05, "etr = {}", out.etr[0]);
        assert!((out.wind_2m[0] - calcs::wind_height_adjust(1.94, 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_domain_is_physical_range_with_day() {
        let engine = ReferenceETEngine::new(&greeley());
        let dates: Vec<NaiveDate> = (1..=2)
            .map(|d| NaiveDate::from_ymd_opt(2021, 7, d).unwrap())
            .collect();

        let err = engine
            .compute(&ReferenceEtInputs {
                dates: &dates,
                tmin: &[12.0, 12.0],
                tmax: &[30.0, 30.0],
                ea: &[1.2, 1.2],
                rs: &[300.0, -20.0],
                wind: &[2.0, 2.0],
            })
            .unwrap_err();

        match err {
            QaqcError::PhysicalRange {
                day_index,
                date,
                parameter,
                ..
            } => {
                assert_eq!(day_index, 1);
                assert_eq!(date, dates[1]);
                assert_eq!(parameter, "rs");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    struct Constant(f64);

    impl ReferenceEtFormula for Constant {
        fn daily(&self, _input: &DailyInput, surface: Surface) -> std::result::Result<f64, RefetError> {
            Ok(match surface {
                Surface::Grass => self.0,
                Surface::Alfalfa => self.0 * 2.0,
            })
        }
    }

    #[test]
    fn test_formula_is_injectable() {
        let engine = ReferenceETEngine::with_formula(&greeley(), Box::new(Constant(5.0)));
        let dates = [NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()];
        let out = engine
            .compute(&ReferenceEtInputs {
                dates: &dates,
                tmin: &[f64::NAN],
                tmax: &[f64::NAN],
                ea: &[f64::NAN],
                rs: &[f64::NAN],
                wind: &[f64::NAN],
            })
            .unwrap();
        assert_eq!(out.eto, vec![5.0]);
        assert_eq!(out.etr, vec![10.0]);
    }
}
