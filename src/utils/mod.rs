pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use coordinates::{dms_to_decimal, parse_coordinate};
pub use filename::OutputPaths;
pub use progress::ProgressReporter;
