use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{QaqcError, Result};
use crate::models::{
    ClimatologySeries, OutputTables, RhBlend, Station, Variable, VariableStore,
};
use crate::processors::{
    check_contract, CorrectionRequest, CorrectionTarget, Corrector, DiffTracker, HumidityInputs,
    HumidityResolver, HumiditySource, MonthlyAggregator, ReferenceETEngine, ReferenceEtInputs,
    SolarRadiationEstimator, TemperatureDeltas, TemperatureSecondary,
};

/// One stage of the recompute cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeStep {
    /// Ea and Tdew from the observed humidity, with climatological gap-fill.
    ResolveHumidity,
    /// Daily Tmax - Tmin and Tmin - Tdew.
    TemperatureSecondary,
    /// Monthly means of the temperature deltas, Tmin and Tdew.
    TemperatureClimatology,
    /// Rso and Rs_TR.
    SolarRadiation,
    /// ETo, ETr and wind at 2 m.
    ReferenceEt,
    EtClimatology,
    RadiationClimatology,
    PrecipitationClimatology,
}

/// Every step, as run on freshly ingested data.
pub const FULL_CASCADE: [CascadeStep; 8] = [
    CascadeStep::ResolveHumidity,
    CascadeStep::TemperatureSecondary,
    CascadeStep::TemperatureClimatology,
    CascadeStep::SolarRadiation,
    CascadeStep::ReferenceEt,
    CascadeStep::EtClimatology,
    CascadeStep::RadiationClimatology,
    CascadeStep::PrecipitationClimatology,
];

const TEMPERATURE_CASCADE: [CascadeStep; 7] = [
    CascadeStep::ResolveHumidity,
    CascadeStep::TemperatureSecondary,
    CascadeStep::TemperatureClimatology,
    CascadeStep::SolarRadiation,
    CascadeStep::ReferenceEt,
    CascadeStep::EtClimatology,
    CascadeStep::RadiationClimatology,
];

const WIND_CASCADE: [CascadeStep; 2] = [CascadeStep::ReferenceEt, CascadeStep::EtClimatology];

const SOLAR_CASCADE: [CascadeStep; 3] = [
    CascadeStep::ReferenceEt,
    CascadeStep::EtClimatology,
    CascadeStep::RadiationClimatology,
];

const PRECIPITATION_CASCADE: [CascadeStep; 1] = [CascadeStep::PrecipitationClimatology];

impl CorrectionTarget {
    /// Steps to re-run after this target was corrected, in order.
    pub fn cascade(self) -> &'static [CascadeStep] {
        match self {
            // Humidity derived from RH depends on Tmax, Tmin and Tavg, so a
            // temperature correction re-runs the full resolution.
            CorrectionTarget::Temperature(_) | CorrectionTarget::Humidity => &TEMPERATURE_CASCADE,
            CorrectionTarget::Wind => &WIND_CASCADE,
            CorrectionTarget::SolarRadiation => &SOLAR_CASCADE,
            CorrectionTarget::Precipitation => &PRECIPITATION_CASCADE,
        }
    }
}

/// Owns the variable store and drives the cascade after ingestion and after
/// each correction pass.
///
/// Every pass runs on a copy of the store that replaces the current one only
/// once all its steps succeeded, so a failed pass leaves the previous results
/// as the valid state.
pub struct RecalculationOrchestrator {
    store: VariableStore,
    humidity: HumidityResolver,
    solar: SolarRadiationEstimator,
    reference_et: ReferenceETEngine,
    max_workers: usize,
    humidity_source: Option<HumiditySource>,
    applied: Vec<CorrectionTarget>,
    initialized: bool,
}

impl RecalculationOrchestrator {
    pub fn new(station: &Station, store: VariableStore) -> Self {
        Self {
            store,
            humidity: HumidityResolver::default(),
            solar: SolarRadiationEstimator::for_station(station),
            reference_et: ReferenceETEngine::new(station),
            max_workers: num_cpus::get(),
            humidity_source: None,
            applied: Vec::new(),
            initialized: false,
        }
    }

    pub fn with_humidity_blend(mut self, blend: RhBlend) -> Self {
        self.humidity = HumidityResolver::new(blend);
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    pub fn humidity_source(&self) -> Option<HumiditySource> {
        self.humidity_source
    }

    /// Correction passes completed so far, in order.
    pub fn applied_corrections(&self) -> &[CorrectionTarget] {
        &self.applied
    }

    pub fn output_tables(&self) -> OutputTables {
        DiffTracker::tables(&self.store)
    }

    /// Run every step on the ingested data and freeze the original snapshot.
    pub fn initial_pass(&mut self) -> Result<()> {
        let start = Instant::now();
        let mut next = self.store.clone();
        let source = self.run_steps(&mut next, &FULL_CASCADE)?;

        next.snapshot_original();
        self.store = next;
        self.humidity_source = source;
        self.initialized = true;

        info!(
            days = self.store.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Initial cascade complete"
        );
        Ok(())
    }

    /// Ask `corrector` for corrected versions of the target's series, then
    /// re-run the target's cascade.
    pub fn apply_correction(&mut self, target: CorrectionTarget, corrector: &mut dyn Corrector) -> Result<()> {
        if !self.initialized {
            self.initial_pass()?;
        }
        let source = self.humidity_source.ok_or(QaqcError::DataInsufficient)?;
        let variables = target.variables(source);
        let start = Instant::now();

        let mut next = self.store.clone();
        for (i, &variable) in variables.iter().enumerate() {
            let companion = variables
                .iter()
                .enumerate()
                .find(|(j, _)| *j != i)
                .map(|(_, &other)| other);

            let corrected = {
                let request = CorrectionRequest {
                    target,
                    variable,
                    values: next.observed(variable),
                    dates: next.dates(),
                    companion: companion.map(|other| (other, next.observed(other))),
                };
                let corrected = corrector.correct(&request)?;
                check_contract(variable, request.values, &corrected)?;
                corrected
            };
            next.set_observed(variable, corrected)?;
        }

        if let Some(resolved) = self.run_steps(&mut next, target.cascade())? {
            self.humidity_source = Some(resolved);
        }
        self.store = next;
        self.applied.push(target);

        info!(
            target = %target,
            steps = target.cascade().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Correction pass complete"
        );
        Ok(())
    }

    /// Run `steps` against `store` on a pool of `max_workers` threads. Returns
    /// the humidity source when the steps resolved humidity.
    fn run_steps(&self, store: &mut VariableStore, steps: &[CascadeStep]) -> Result<Option<HumiditySource>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| QaqcError::Configuration(format!("Failed to build worker pool: {}", e)))?;

        pool.install(|| {
            let mut source = None;
            for &step in steps {
                debug!(step = ?step, "Running cascade step");
                if let Some(resolved) = self.run_step(store, step)? {
                    source = Some(resolved);
                }
            }
            Ok(source)
        })
    }

    fn run_step(&self, store: &mut VariableStore, step: CascadeStep) -> Result<Option<HumiditySource>> {
        match step {
            CascadeStep::ResolveHumidity => {
                let resolved = self.humidity.resolve(&HumidityInputs::from_store(store))?;
                store.set_current(Variable::VaporPressure, resolved.ea)?;
                store.set_current(Variable::TDew, resolved.tdew)?;
                store.set_humidity_baseline(resolved.derived_ea, resolved.derived_tdew)?;
                store.set_fill_mask(resolved.fill_mask);
                return Ok(Some(resolved.source));
            }
            CascadeStep::TemperatureSecondary => {
                let deltas = TemperatureSecondary::compute(
                    store.current(Variable::TMax),
                    store.current(Variable::TMin),
                    store.current(Variable::TDew),
                )?;
                store.set_temperature_deltas(deltas.delta_t, deltas.tmin_minus_tdew)?;
            }
            CascadeStep::TemperatureClimatology => {
                let deltas = TemperatureDeltas {
                    delta_t: store.delta_t().to_vec(),
                    tmin_minus_tdew: store.tmin_minus_tdew().to_vec(),
                };
                let means = TemperatureSecondary::climatologies(
                    &deltas,
                    store.current(Variable::TMin),
                    store.current(Variable::TDew),
                    store.months(),
                );
                for (series, climatology) in means {
                    store.climatology_mut().insert(series, climatology);
                }
            }
            CascadeStep::SolarRadiation => {
                let mm_delta_t = store.climatology().get(ClimatologySeries::DeltaT);
                let missing = mm_delta_t.missing_months();
                if !missing.is_empty() {
                    warn!(months = ?missing, "No Tmax - Tmin climatology for some months, Rs_TR will be missing there");
                }
                let estimates = self.solar.compute(
                    store.dates(),
                    store.current(Variable::VaporPressure),
                    store.delta_t(),
                    &mm_delta_t,
                )?;
                store.set_current(Variable::Rso, estimates.rso)?;
                store.set_current(Variable::RsTr, estimates.rs_tr)?;
            }
            CascadeStep::ReferenceEt => {
                let et = self.reference_et.compute(&ReferenceEtInputs {
                    dates: store.dates(),
                    tmin: store.current(Variable::TMin),
                    tmax: store.current(Variable::TMax),
                    ea: store.current(Variable::VaporPressure),
                    rs: store.current(Variable::Rs),
                    wind: store.current(Variable::WindSpeed),
                })?;
                store.set_current(Variable::Eto, et.eto)?;
                store.set_current(Variable::Etr, et.etr)?;
                store.set_current(Variable::Wind2m, et.wind_2m)?;
            }
            CascadeStep::EtClimatology => {
                aggregate_into(store, &[
                    (ClimatologySeries::Eto, Variable::Eto),
                    (ClimatologySeries::Etr, Variable::Etr),
                ]);
            }
            CascadeStep::RadiationClimatology => {
                aggregate_into(store, &[
                    (ClimatologySeries::Rs, Variable::Rs),
                    (ClimatologySeries::RsTr, Variable::RsTr),
                    (ClimatologySeries::Rso, Variable::Rso),
                ]);
            }
            CascadeStep::PrecipitationClimatology => {
                aggregate_into(store, &[(ClimatologySeries::Precip, Variable::Precip)]);
            }
        }
        Ok(None)
    }
}

fn aggregate_into(store: &mut VariableStore, pairs: &[(ClimatologySeries, Variable)]) {
    for &(series, variable) in pairs {
        let climatology = MonthlyAggregator::aggregate(store.current(variable), store.months());
        store.climatology_mut().insert(series, climatology);
    }
}
