use thiserror::Error;

// Unified error type for stopcrit

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StopError {
    #[error("invalid parameter {name} = {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("iteration number must be non-negative, got {0}")]
    NegativeIteration(i64),
    #[error("vector lengths differ: solution {solution_len}, source {source_len}, residual {residual_len}")]
    LengthMismatch {
        solution_len: usize,
        source_len: usize,
        residual_len: usize,
    },
    #[error("solver breakdown: {0}")]
    Breakdown(String),
}

impl StopError {
    pub(crate) fn invalid(name: &'static str, value: impl ToString, expected: &'static str) -> Self {
        StopError::InvalidParameter {
            name,
            value: value.to_string(),
            expected,
        }
    }

    /// True for errors raised by bad configuration values.
    pub fn is_configuration(&self) -> bool {
        matches!(self, StopError::InvalidParameter { .. })
    }

    /// True for errors raised by a caller violating the evaluation contract.
    pub fn is_input_contract(&self) -> bool {
        matches!(
            self,
            StopError::NegativeIteration(_) | StopError::LengthMismatch { .. }
        )
    }
}
