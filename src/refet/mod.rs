//! ASCE standardized reference evapotranspiration (daily time step).
//!
//! A pure, stateless formula set: every function depends only on its scalar
//! arguments. Missing inputs (NaN) propagate to NaN outputs; inputs outside the
//! physical domain of the equations are rejected with [`RefetError`].

pub mod calcs;
pub mod daily;
pub mod error;

pub use daily::{AsceStandardized, DailyInput, ReferenceEtFormula, Surface};
pub use error::RefetError;
