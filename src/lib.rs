pub mod analyzers;
pub mod cli;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod refet;
pub mod utils;
pub mod writers;

pub use error::{QaqcError, Result};
