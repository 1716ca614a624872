use crate::refet::calcs;
use crate::refet::error::RefetError;

/// Reference crop surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Short reference crop, ETo.
    Grass,
    /// Tall reference crop, ETr.
    Alfalfa,
}

impl Surface {
    /// Numerator constant Cn for the daily time step (Table 1).
    pub fn cn(self) -> f64 {
        match self {
            Surface::Grass => 900.0,
            Surface::Alfalfa => 1600.0,
        }
    }

    /// Denominator constant Cd for the daily time step (Table 1).
    pub fn cd(self) -> f64 {
        match self {
            Surface::Grass => 0.34,
            Surface::Alfalfa => 0.38,
        }
    }
}

/// Scalar arguments of one daily reference ET evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyInput {
    /// Minimum air temperature, C.
    pub tmin: f64,
    /// Maximum air temperature, C.
    pub tmax: f64,
    /// Actual vapor pressure, kPa.
    pub ea: f64,
    /// Incoming shortwave radiation, MJ m-2 d-1.
    pub rs: f64,
    /// Wind speed at measurement height, m s-1.
    pub uz: f64,
    /// Wind measurement height, m.
    pub zw: f64,
    /// Station elevation, m.
    pub elev: f64,
    /// Latitude, decimal degrees.
    pub lat: f64,
    /// Day of year.
    pub doy: u32,
}

/// A reference evapotranspiration formula implementation.
pub trait ReferenceEtFormula: Send + Sync {
    /// Daily reference ET in mm for the given surface.
    fn daily(&self, input: &DailyInput, surface: Surface) -> Result<f64, RefetError>;
}

/// The ASCE-EWRI standardized Penman-Monteith equation (Eq. 1), daily form.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsceStandardized;

impl AsceStandardized {
    pub fn new() -> Self {
        Self
    }

    fn check_domain(input: &DailyInput) -> Result<(), RefetError> {
        let reject = |parameter: &'static str, value: f64| RefetError::OutOfDomain { parameter, value };

        if input.rs < 0.0 {
            return Err(reject("rs", input.rs));
        }
        if input.ea < 0.0 {
            return Err(reject("ea", input.ea));
        }
        if input.uz < 0.0 {
            return Err(reject("uz", input.uz));
        }
        // log wind profile must stay positive
        if !(67.8 * input.zw - 5.42 > 1.0) {
            return Err(reject("zw", input.zw));
        }
        if !(-90.0..=90.0).contains(&input.lat) {
            return Err(reject("lat", input.lat));
        }
        if !(1..=366).contains(&input.doy) {
            return Err(reject("doy", input.doy as f64));
        }
        Ok(())
    }
}

impl ReferenceEtFormula for AsceStandardized {
    fn daily(&self, input: &DailyInput, surface: Surface) -> Result<f64, RefetError> {
        Self::check_domain(input)?;

        let doy = input.doy as f64;
        let lat = input.lat.to_radians();
        let tmean = 0.5 * (input.tmax + input.tmin);

        let pair = calcs::air_pressure(input.elev);
        let psy = 0.000665 * pair;
        let es = 0.5 * (calcs::sat_vapor_pressure(input.tmax) + calcs::sat_vapor_pressure(input.tmin));
        let es_slope = calcs::es_slope(tmean);
        let u2 = calcs::wind_height_adjust(input.uz, input.zw);

        let ra = calcs::ra_daily(lat, doy);
        let rso = calcs::rso_daily(ra, input.ea, pair, doy, lat);
        let fcd = calcs::fcd_daily(input.rs, rso);
        let rnl = calcs::rnl_daily(input.tmax, input.tmin, input.ea, fcd);
        let rn = calcs::rn_daily(input.rs, rnl);

        // Soil heat flux is zero at the daily step
        let numerator = 0.408 * es_slope * rn
            + psy * (surface.cn() / (tmean + 273.0)) * u2 * (es - input.ea);
        let denominator = es_slope + psy * (1.0 + surface.cd() * u2);

        Ok(numerator / denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeley_july() -> DailyInput {
        // Greeley CO, 1 July
        DailyInput {
            tmin: 12.98,
            tmax: 32.44,
            ea: 1.26,
            rs: 27.80,
            uz: 1.94,
            zw: 3.0,
            elev: 1462.4,
            lat: 40.41,
            doy: 183,
        }
    }

    #[test]
    fn test_greeley_reference_day() {
        let formula = AsceStandardized::new();
        let eto = formula.daily(&greeley_july(), Surface::Grass).unwrap();
        let etr = formula.daily(&greeley_july(), Surface::Alfalfa).unwrap();

        assert!((eto - 6.42).abs() < 0.05, "eto = {}", eto);
        assert!((etr - 8.08).abs() < 0.05, "etr = {}", etr);
        assert!(etr > eto);
    }

    #[test]
    fn test_negative_radiation_is_rejected() {
        let mut input = greeley_july();
        input.rs = -1.0;
        assert_eq!(
            AsceStandardized::new().daily(&input, Surface::Grass),
            Err(RefetError::OutOfDomain {
                parameter: "rs",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_domain_checks() {
        let formula = AsceStandardized::new();
        let cases: [(&str, fn(&mut DailyInput)); 5] = [
            ("ea", |i| i.ea = -0.1),
            ("uz", |i| i.uz = -3.0),
            ("zw", |i| i.zw = 0.05),
            ("lat", |i| i.lat = 95.0),
            ("doy", |i| i.doy = 0),
        ];
        for (parameter, mutate) in cases {
            let mut input = greeley_july();
            mutate(&mut input);
            match formula.daily(&input, Surface::Grass) {
                Err(RefetError::OutOfDomain { parameter: p, .. }) => assert_eq!(p, parameter),
                other => panic!("expected {} rejection, got {:?}", parameter, other),
            }
        }
    }

    #[test]
    fn test_missing_input_gives_missing_output() {
        let mut input = greeley_july();
        input.uz = f64::NAN;
        let eto = AsceStandardized::new().daily(&input, Surface::Grass).unwrap();
        assert!(eto.is_nan());
    }
}
