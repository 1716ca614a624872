use chrono::{Datelike, NaiveDate};
use rayon::prelude::*;

use crate::error::{QaqcError, Result};
use crate::models::{MonthlyClimatology, Station};
use crate::refet::calcs;
use crate::utils::constants::{MJ_PER_DAY_TO_W, TR_B0, TR_B1, TR_B2};

/// Clear-sky and Thornton-Running radiation, both in W m-2.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarEstimates {
    pub rso: Vec<f64>,
    pub rs_tr: Vec<f64>,
}

/// Estimates clear-sky radiation and a temperature-range based estimate of
/// actual radiation for one station.
#[derive(Debug, Clone, Copy)]
pub struct SolarRadiationEstimator {
    latitude: f64,
    pressure: f64,
}

impl SolarRadiationEstimator {
    /// `latitude` in decimal degrees, `pressure` in kPa.
    pub fn new(latitude: f64, pressure: f64) -> Self {
        Self { latitude, pressure }
    }

    pub fn for_station(station: &Station) -> Self {
        Self::new(station.latitude, station.pressure())
    }

    /// Single day in MJ m-2 d-1. `mm_delta_t` is the monthly mean of Tmax - Tmin
    /// for the day's month and `delta_t` the day's own range.
    ///
    /// A negative range gives NaN for the Thornton-Running estimate.
    pub fn daily_mj(
        &self,
        ea: f64,
        doy: u32,
        mm_delta_t: f64,
        delta_t: f64,
    ) -> std::result::Result<(f64, f64), (&'static str, f64)> {
        if ea < 0.0 {
            return Err(("ea", ea));
        }
        if !(1..=366).contains(&doy) {
            return Err(("doy", doy as f64));
        }

        let lat = self.latitude.to_radians();
        let ra = calcs::ra_daily(lat, doy as f64);
        let rso = calcs::rso_daily(ra, ea, self.pressure, doy as f64, lat);

        let b = TR_B0 + TR_B1 * (TR_B2 * mm_delta_t).exp();
        let rs_tr = if delta_t < 0.0 {
            f64::NAN
        } else {
            rso * (1.0 - 0.9 * (-b * delta_t.powf(1.5)).exp())
        };

        Ok((rso, rs_tr))
    }

    /// Every day, converted to W m-2.
    pub fn compute(
        &self,
        dates: &[NaiveDate],
        ea: &[f64],
        delta_t: &[f64],
        mm_delta_t: &MonthlyClimatology,
    ) -> Result<SolarEstimates> {
        for series in [ea, delta_t] {
            if series.len() != dates.len() {
                return Err(QaqcError::LengthMismatch {
                    expected: dates.len(),
                    actual: series.len(),
                });
            }
        }

        let days: Vec<(f64, f64)> = dates
            .par_iter()
            .enumerate()
            .map(|(day, date)| {
                self.daily_mj(ea[day], date.ordinal(), mm_delta_t.get(date.month()), delta_t[day])
                    .map(|(rso, rs_tr)| (rso * MJ_PER_DAY_TO_W, rs_tr * MJ_PER_DAY_TO_W))
                    .map_err(|(parameter, value)| QaqcError::PhysicalRange {
                        day_index: day,
                        date: *date,
                        parameter,
                        value,
                    })
            })
            .collect::<Result<_>>()?;

        let (rso, rs_tr) = days.into_iter().unzip();
        Ok(SolarEstimates { rso, rs_tr })
    }
}
