pub mod qaqc_analyzer;

pub use qaqc_analyzer::{QaqcAnalyzer, QaqcSummary, VariableCompleteness};
