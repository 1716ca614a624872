pub mod correction;
pub mod diff_tracker;
pub mod humidity;
pub mod monthly_aggregator;
pub mod orchestrator;
pub mod reference_et;
pub mod solar;
pub mod temperature;

pub use correction::{
    check_contract, CorrectionEdit, CorrectionRequest, CorrectionTarget, Corrector, PresetCorrector,
    TemperaturePair,
};
pub use diff_tracker::DiffTracker;
pub use humidity::{
    dewpoint_from_vapor_pressure, fill_dewpoint_gaps, saturation_vapor_pressure, HumidityInputs,
    HumidityResolver, HumiditySource, ResolvedHumidity,
};
pub use monthly_aggregator::MonthlyAggregator;
pub use orchestrator::{CascadeStep, RecalculationOrchestrator, FULL_CASCADE};
pub use reference_et::{ReferenceETEngine, ReferenceEt, ReferenceEtInputs};
pub use solar::{SolarEstimates, SolarRadiationEstimator};
pub use temperature::{TemperatureDeltas, TemperatureSecondary};
