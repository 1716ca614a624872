use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{QaqcError, Result};
use crate::models::{FillMask, MonthlyClimatology, RhBlend, Variable, VariableStore};
use crate::processors::MonthlyAggregator;
use crate::utils::constants::{
    DEWPOINT_A, DEWPOINT_B, DEWPOINT_C, SAT_VP_COEFF, SAT_VP_EXP, SAT_VP_OFFSET,
};

/// Saturation vapor pressure at `t` degrees C, kPa.
pub fn saturation_vapor_pressure(t: f64) -> f64 {
    SAT_VP_COEFF * ((SAT_VP_EXP * t) / (t + SAT_VP_OFFSET)).exp()
}

/// Dewpoint temperature from actual vapor pressure; NaN for non-positive `ea`.
pub fn dewpoint_from_vapor_pressure(ea: f64) -> f64 {
    if ea.is_nan() || ea <= 0.0 {
        return f64::NAN;
    }
    let ln_ea = ea.ln();
    (DEWPOINT_A + DEWPOINT_B * ln_ea) / (DEWPOINT_C - ln_ea)
}

/// Which observed humidity measurement drives the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HumiditySource {
    VaporPressure,
    Dewpoint,
    RelativeHumidityExtremes,
    RelativeHumidityMean,
}

impl HumiditySource {
    pub const PRIORITY: [HumiditySource; 4] = [
        HumiditySource::VaporPressure,
        HumiditySource::Dewpoint,
        HumiditySource::RelativeHumidityExtremes,
        HumiditySource::RelativeHumidityMean,
    ];

    /// Observed series this source consists of; these are the ones a humidity
    /// correction edits.
    pub fn variables(self) -> &'static [Variable] {
        match self {
            HumiditySource::VaporPressure => &[Variable::VaporPressure],
            HumiditySource::Dewpoint => &[Variable::TDew],
            HumiditySource::RelativeHumidityExtremes => &[Variable::RhMax, Variable::RhMin],
            HumiditySource::RelativeHumidityMean => &[Variable::RhAvg],
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            HumiditySource::VaporPressure => "vapor pressure",
            HumiditySource::Dewpoint => "dewpoint temperature",
            HumiditySource::RelativeHumidityExtremes => "RH maximum and minimum",
            HumiditySource::RelativeHumidityMean => "RH average",
        }
    }

    /// Highest-priority source with at least one observed value.
    pub fn detect(inputs: &HumidityInputs<'_>) -> Option<Self> {
        let any = |series: &[f64]| series.iter().any(|v| !v.is_nan());
        Self::PRIORITY.into_iter().find(|source| match source {
            HumiditySource::VaporPressure => any(inputs.ea),
            HumiditySource::Dewpoint => any(inputs.tdew),
            HumiditySource::RelativeHumidityExtremes => any(inputs.rhmax) && any(inputs.rhmin),
            HumiditySource::RelativeHumidityMean => any(inputs.rhavg),
        })
    }
}

impl std::fmt::Display for HumiditySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Borrowed view of the observed series the resolver reads.
#[derive(Debug, Clone, Copy)]
pub struct HumidityInputs<'a> {
    pub tavg: &'a [f64],
    pub tmax: &'a [f64],
    pub tmin: &'a [f64],
    pub tdew: &'a [f64],
    pub ea: &'a [f64],
    pub rhavg: &'a [f64],
    pub rhmax: &'a [f64],
    pub rhmin: &'a [f64],
    pub months: &'a [u32],
}

impl<'a> HumidityInputs<'a> {
    pub fn from_store(store: &'a VariableStore) -> Self {
        Self {
            tavg: store.observed(Variable::TAvg),
            tmax: store.observed(Variable::TMax),
            tmin: store.observed(Variable::TMin),
            tdew: store.observed(Variable::TDew),
            ea: store.observed(Variable::VaporPressure),
            rhavg: store.observed(Variable::RhAvg),
            rhmax: store.observed(Variable::RhMax),
            rhmin: store.observed(Variable::RhMin),
            months: store.months(),
        }
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    fn check_lengths(&self) -> Result<()> {
        let expected = self.len();
        for series in [
            self.tavg, self.tmax, self.tmin, self.tdew, self.ea, self.rhavg, self.rhmax, self.rhmin,
        ] {
            if series.len() != expected {
                return Err(QaqcError::LengthMismatch {
                    expected,
                    actual: series.len(),
                });
            }
        }
        Ok(())
    }
}

/// Output of one humidity resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHumidity {
    pub ea: Vec<f64>,
    pub tdew: Vec<f64>,
    /// Ea and Tdew from each day's own observations, before the climatology
    /// gap-fill. This is the audit baseline of the two columns.
    pub derived_ea: Vec<f64>,
    pub derived_tdew: Vec<f64>,
    /// Positions of `ea` and `tdew` that were synthesized by this resolution.
    pub fill_mask: FillMask,
    pub source: HumiditySource,
}

/// Resolves a vapor pressure and dewpoint pair from whatever humidity exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumidityResolver {
    blend: RhBlend,
}

impl HumidityResolver {
    pub fn new(blend: RhBlend) -> Self {
        Self { blend }
    }

    /// Vapor pressure from the RH extremes and temperature extremes.
    pub fn blend_vapor_pressure(&self, tmax: f64, tmin: f64, rhmax: f64, rhmin: f64) -> f64 {
        let from_tmin = saturation_vapor_pressure(tmin) * (rhmax / 100.0);
        let from_tmax = saturation_vapor_pressure(tmax) * (rhmin / 100.0);
        match self.blend {
            // Only the RHmin term is halved
            RhBlend::Legacy => from_tmin + from_tmax / 2.0,
            RhBlend::Averaged => (from_tmin + from_tmax) / 2.0,
        }
    }

    /// Resolve one day from its own observations, trying sources in priority
    /// order. Observed values are kept as they are.
    fn derive_day(&self, inputs: &HumidityInputs<'_>, day: usize) -> (f64, f64) {
        let ea = inputs.ea[day];
        let tdew = inputs.tdew[day];

        if !ea.is_nan() {
            let tdew = if tdew.is_nan() {
                dewpoint_from_vapor_pressure(ea)
            } else {
                tdew
            };
            return (ea, tdew);
        }
        if !tdew.is_nan() {
            return (saturation_vapor_pressure(tdew), tdew);
        }

        let from_extremes = self.blend_vapor_pressure(
            inputs.tmax[day],
            inputs.tmin[day],
            inputs.rhmax[day],
            inputs.rhmin[day],
        );
        if !from_extremes.is_nan() {
            return (from_extremes, dewpoint_from_vapor_pressure(from_extremes));
        }

        let from_mean = saturation_vapor_pressure(inputs.tavg[day]) * (inputs.rhavg[day] / 100.0);
        if !from_mean.is_nan() {
            return (from_mean, dewpoint_from_vapor_pressure(from_mean));
        }

        (f64::NAN, f64::NAN)
    }

    /// Resolve Ea and Tdew for every day.
    ///
    /// After per-day derivation, remaining dewpoint gaps are filled from the
    /// monthly Tmin - Tdew climatology and vapor pressure is refilled from the
    /// filled dewpoint. The returned mask marks exactly the positions that were
    /// missing in the observations and hold a synthesized value now.
    pub fn resolve(&self, inputs: &HumidityInputs<'_>) -> Result<ResolvedHumidity> {
        inputs.check_lengths()?;
        let source = HumiditySource::detect(inputs).ok_or(QaqcError::DataInsufficient)?;
        debug!(source = %source, days = inputs.len(), "Resolving humidity");

        let (ea, tdew): (Vec<f64>, Vec<f64>) = (0..inputs.len())
            .into_par_iter()
            .map(|day| self.derive_day(inputs, day))
            .unzip();
        let derived_ea = ea.clone();
        let derived_tdew = tdew.clone();
        let mut ea = ea;
        let mut tdew = tdew;

        let tmin_minus_tdew: Vec<f64> = inputs
            .tmin
            .iter()
            .zip(&tdew)
            .map(|(tmin, tdew)| tmin - tdew)
            .collect();
        let climatology = MonthlyAggregator::aggregate(&tmin_minus_tdew, inputs.months);

        let filled_tdew = fill_dewpoint_gaps(&mut tdew, inputs.tmin, inputs.months, &climatology);
        let filled_ea = refill_vapor_pressure(&mut ea, &tdew);

        let mut fill_mask = FillMask::new(inputs.len());
        for day in 0..inputs.len() {
            if inputs.ea[day].is_nan() && !ea[day].is_nan() {
                fill_mask.mark(Variable::VaporPressure, day);
            }
            if inputs.tdew[day].is_nan() && !tdew[day].is_nan() {
                fill_mask.mark(Variable::TDew, day);
            }
        }

        info!(
            source = %source,
            climatology_tdew_fills = filled_tdew,
            climatology_ea_fills = filled_ea,
            ea_synthesized = fill_mask.count(Variable::VaporPressure),
            tdew_synthesized = fill_mask.count(Variable::TDew),
            "Humidity resolved"
        );

        Ok(ResolvedHumidity {
            ea,
            tdew,
            derived_ea,
            derived_tdew,
            fill_mask,
            source,
        })
    }
}

/// Fill missing dewpoints as `Tmin - climatology[month]`. Returns the number
/// of days that received a value.
pub fn fill_dewpoint_gaps(
    tdew: &mut [f64],
    tmin: &[f64],
    months: &[u32],
    tmin_minus_tdew: &MonthlyClimatology,
) -> usize {
    let mut filled = 0;
    for ((tdew, &tmin), &month) in tdew.iter_mut().zip(tmin).zip(months) {
        if tdew.is_nan() {
            *tdew = tmin - tmin_minus_tdew.get(month);
            if !tdew.is_nan() {
                filled += 1;
            }
        }
    }
    filled
}

/// Refill missing vapor pressure from dewpoint. Returns the number of days
/// that received a value.
pub fn refill_vapor_pressure(ea: &mut [f64], tdew: &[f64]) -> usize {
    let mut filled = 0;
    for (ea, &tdew) in ea.iter_mut().zip(tdew) {
        if ea.is_nan() {
            *ea = saturation_vapor_pressure(tdew);
            if !ea.is_nan() {
                filled += 1;
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Columns {
        tavg: Vec<f64>,
        tmax: Vec<f64>,
        tmin: Vec<f64>,
        tdew: Vec<f64>,
        ea: Vec<f64>,
        rhavg: Vec<f64>,
        rhmax: Vec<f64>,
        rhmin: Vec<f64>,
        months: Vec<u32>,
    }

    impl Columns {
        fn new(n: usize) -> Self {
            Self {
                tavg: vec![f64::NAN; n],
                tmax: vec![30.0; n],
                tmin: vec![10.0; n],
                tdew: vec![f64::NAN; n],
                ea: vec![f64::NAN; n],
                rhavg: vec![f64::NAN; n],
                rhmax: vec![f64::NAN; n],
                rhmin: vec![f64::NAN; n],
                months: vec![1; n],
            }
        }

        fn inputs(&self) -> HumidityInputs<'_> {
            HumidityInputs {
                tavg: &self.tavg,
                tmax: &self.tmax,
                tmin: &self.tmin,
                tdew: &self.tdew,
                ea: &self.ea,
                rhavg: &self.rhavg,
                rhmax: &self.rhmax,
                rhmin: &self.rhmin,
                months: &self.months,
            }
        }
    }

    #[test]
    fn test_dewpoint_inverts_saturation_pressure() {
        for t in [-10.0, 0.0, 12.5, 25.0] {
            let back = dewpoint_from_vapor_pressure(saturation_vapor_pressure(t));
            assert!((back - t).abs() < 0.05, "t = {}, back = {}", t, back);
        }
        assert!(dewpoint_from_vapor_pressure(0.0).is_nan());
        assert!(dewpoint_from_vapor_pressure(-1.0).is_nan());
    }

    #[test]
    fn test_no_humidity_is_data_insufficient() {
        let cols = Columns::new(3);
        let result = HumidityResolver::default().resolve(&cols.inputs());
        assert!(matches!(result, Err(QaqcError::DataInsufficient)));
    }

    #[test]
    fn test_legacy_blend_halves_only_rhmin_term() {
        let mut cols = Columns::new(1);
        cols.rhmax = vec![80.0];
        cols.rhmin = vec![20.0];

        let resolved = HumidityResolver::new(RhBlend::Legacy)
            .resolve(&cols.inputs())
            .unwrap();

        let expected = saturation_vapor_pressure(10.0) * 0.8 + (saturation_vapor_pressure(30.0) * 0.2) / 2.0;
        assert!((resolved.ea[0] - expected).abs() < 1e-12);
        assert!((resolved.ea[0] - 1.4067).abs() < 1e-3);
        assert!((resolved.tdew[0] - dewpoint_from_vapor_pressure(expected)).abs() < 1e-12);
        assert_eq!(resolved.source, HumiditySource::RelativeHumidityExtremes);
    }

    #[test]
    fn test_averaged_blend() {
        let resolver = HumidityResolver::new(RhBlend::Averaged);
        let ea = resolver.blend_vapor_pressure(30.0, 10.0, 80.0, 20.0);
        let expected = (saturation_vapor_pressure(10.0) * 0.8 + saturation_vapor_pressure(30.0) * 0.2) / 2.0;
        assert!((ea - expected).abs() < 1e-12);
    }

    #[test]
    fn test_observed_vapor_pressure_is_kept_exactly() {
        let mut cols = Columns::new(3);
        cols.ea = vec![1.234_567, f64::NAN, 0.987_654];
        cols.tdew = vec![f64::NAN, 8.0, f64::NAN];

        let resolved = HumidityResolver::default().resolve(&cols.inputs()).unwrap();

        assert_eq!(resolved.ea[0], 1.234_567);
        assert_eq!(resolved.ea[2], 0.987_654);
        assert_eq!(resolved.tdew[1], 8.0);
        assert!((resolved.ea[1] - saturation_vapor_pressure(8.0)).abs() < 1e-12);
        assert!(!resolved.fill_mask.is_filled(Variable::VaporPressure, 0));
        assert!(resolved.fill_mask.is_filled(Variable::VaporPressure, 1));
        assert!(resolved.fill_mask.is_filled(Variable::TDew, 0));
        assert!(!resolved.fill_mask.is_filled(Variable::TDew, 1));
    }

    #[test]
    fn test_rh_mean_fallback_per_day() {
        let mut cols = Columns::new(2);
        cols.tavg = vec![20.0, 20.0];
        cols.rhmax = vec![80.0, f64::NAN];
        cols.rhmin = vec![20.0, f64::NAN];
        cols.rhavg = vec![f64::NAN, 50.0];

        let resolved = HumidityResolver::default().resolve(&cols.inputs()).unwrap();

        assert!((resolved.ea[1] - saturation_vapor_pressure(20.0) * 0.5).abs() < 1e-12);
        assert_eq!(resolved.source, HumiditySource::RelativeHumidityExtremes);
    }

    #[test]
    fn test_climatology_fills_missing_dewpoint_then_vapor_pressure() {
        let mut cols = Columns::new(3);
        cols.tdew = vec![4.0, 6.0, f64::NAN];
        cols.tmin = vec![10.0, 10.0, 12.0];

        let resolved = HumidityResolver::default().resolve(&cols.inputs()).unwrap();

        // January Tmin - Tdew mean is 5.0
        assert!((resolved.tdew[2] - 7.0).abs() < 1e-12);
        assert!((resolved.ea[2] - saturation_vapor_pressure(7.0)).abs() < 1e-12);
        assert!(resolved.fill_mask.is_filled(Variable::TDew, 2));
        assert!(resolved.fill_mask.is_filled(Variable::VaporPressure, 2));

        // the baseline keeps the gap the climatology closed
        assert_eq!(&resolved.derived_tdew[..2], &[4.0, 6.0]);
        assert!(resolved.derived_tdew[2].is_nan());
        assert!(resolved.derived_ea[2].is_nan());
        assert!((resolved.derived_ea[0] - saturation_vapor_pressure(4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_january_dewpoint_resolves_from_earlier_january() {
        // Two Januaries with Tmax 30 and Tmin 10; only the first has dewpoints
        let mut cols = Columns::new(62);
        for day in 0..31 {
            cols.tdew[day] = 5.0;
        }

        let resolved = HumidityResolver::default().resolve(&cols.inputs()).unwrap();

        assert_eq!(resolved.source, HumiditySource::Dewpoint);
        for day in 31..62 {
            assert!((resolved.tdew[day] - 5.0).abs() < 1e-12, "day {}", day);
            assert!(resolved.fill_mask.is_filled(Variable::TDew, day));
            assert!(resolved.fill_mask.is_filled(Variable::VaporPressure, day));
        }
        assert!((0..31).all(|day| !resolved.fill_mask.is_filled(Variable::TDew, day)));
        assert_eq!(resolved.fill_mask.count(Variable::TDew), 31);
    }

    #[test]
    fn test_fill_dewpoint_gaps_with_given_climatology() {
        let mut tdew = vec![f64::NAN; 31];
        let tmin = vec![10.0; 31];
        let months = vec![1; 31];
        let mut means = [f64::NAN; 12];
        means[0] = 5.0;

        let filled = fill_dewpoint_gaps(&mut tdew, &tmin, &months, &MonthlyClimatology::new(means));

        assert_eq!(filled, 31);
        assert!(tdew.iter().all(|&t| t == 5.0));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut cols = Columns::new(4);
        cols.rhmax = vec![80.0, 75.0, f64::NAN, 90.0];
        cols.rhmin = vec![20.0, 25.0, f64::NAN, 30.0];
        cols.months = vec![1, 1, 1, 2];

        let resolver = HumidityResolver::default();
        let first = resolver.resolve(&cols.inputs()).unwrap();

        cols.ea = first.ea.clone();
        cols.tdew = first.tdew.clone();
        let second = resolver.resolve(&cols.inputs()).unwrap();

        assert_eq!(first.ea, second.ea);
        assert_eq!(first.tdew, second.tdew);
        assert!(second.fill_mask.is_clear());
    }

    #[test]
    fn test_detect_priority() {
        let mut cols = Columns::new(2);
        cols.rhavg = vec![50.0, f64::NAN];
        assert_eq!(
            HumiditySource::detect(&cols.inputs()),
            Some(HumiditySource::RelativeHumidityMean)
        );

        cols.tdew = vec![f64::NAN, 3.0];
        assert_eq!(HumiditySource::detect(&cols.inputs()), Some(HumiditySource::Dewpoint));
    }
}
