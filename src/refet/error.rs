/// Error type for the reference ET formula set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RefetError {
    /// Returned when a non-missing input lies outside the accepted domain.
    #[error("{parameter} = {value} is outside the accepted domain")]
    OutOfDomain {
        /// Name of the offending argument.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },
}
