//! Error type shared by every model in the crate.
//!
//! Construction failures are reported as `InvalidInput`; the only failure a
//! run can produce on valid input is a degenerate implicit update.

use thiserror::Error;

/// Result alias used across the crate.
pub type MetabResult<T> = Result<T, MetabError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetabError {
    /// Driving data, parameters or settings are unusable.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The denominator of a semi-implicit update is too close to zero.
    #[error("numerical instability at step {step}: implicit denominator {denominator}")]
    NumericalInstability { step: usize, denominator: f64 },
}

impl MetabError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Two series that must be parallel have different lengths.
    pub fn length_mismatch(name: &str, len: usize, expected_name: &str, expected: usize) -> Self {
        Self::invalid(format!(
            "{name} length {len} does not match {expected_name} length {expected}"
        ))
    }
}
