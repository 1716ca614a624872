pub mod climatology;
pub mod daily;
pub mod fill_mask;
pub mod station;
pub mod store;
pub mod variable;

pub use climatology::{ClimatologySeries, ClimatologyTable, MonthlyClimatology};
pub use daily::{DailyRecord, DailyTable, OutputTables, TableRow};
pub use fill_mask::FillMask;
pub use station::{RhBlend, Station, StationConfig};
pub use store::VariableStore;
pub use variable::{Variable, VariableKind};
