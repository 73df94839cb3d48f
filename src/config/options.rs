//! Options for assembling the standard set of stop criteria.
//!
//! `StopOptions` collects the knobs of every built-in criterium in one place so
//! whatever assembles a solver can configure the stopping rule from a single
//! struct. `Default` carries the library defaults; [`StopOptions::build`]
//! validates everything and returns a [`CompositeStopCriterium`] holding, in
//! order, the failure, divergence, iteration-count and residual criteria.

use crate::core::traits::Modulus;
use crate::criterium::divergence::{DEFAULT_MAXIMUM_RELATIVE_INCREASE, DEFAULT_MINIMUM_NUMBER_OF_ITERATIONS};
use crate::criterium::iteration_count::DEFAULT_MAXIMUM_NUMBER_OF_ITERATIONS;
use crate::criterium::residual::{DEFAULT_MAXIMUM_RESIDUAL, DEFAULT_MINIMUM_ITERATIONS_BELOW_MAXIMUM};
use crate::criterium::{
    CompositeStopCriterium, DivergenceStopCriterium, FailureStopCriterium, IterationCountStopCriterium,
    ResidualStopCriterium,
};
use crate::error::StopError;

/// Stop-criteria parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StopOptions {
    /// Relative residual threshold ‖r‖/‖b‖
    pub maximum_residual: f64,

    /// Iterations the residual must stay below the threshold
    pub minimum_iterations_below_maximum: i64,

    /// Iteration budget
    pub maximum_iterations: i64,

    /// Relative growth per step that counts as diverging
    pub maximum_relative_increase: f64,

    /// Steps of consecutive growth before divergence is declared
    pub minimum_divergence_iterations: i64,
}

impl Default for StopOptions {
    fn default() -> Self {
        Self {
            maximum_residual: DEFAULT_MAXIMUM_RESIDUAL,
            minimum_iterations_below_maximum: DEFAULT_MINIMUM_ITERATIONS_BELOW_MAXIMUM as i64,
            maximum_iterations: DEFAULT_MAXIMUM_NUMBER_OF_ITERATIONS as i64,
            maximum_relative_increase: DEFAULT_MAXIMUM_RELATIVE_INCREASE,
            minimum_divergence_iterations: DEFAULT_MINIMUM_NUMBER_OF_ITERATIONS as i64,
        }
    }
}

impl StopOptions {
    pub fn with_maximum_residual(mut self, maximum: f64) -> Self {
        self.maximum_residual = maximum;
        self
    }

    pub fn with_minimum_iterations_below_maximum(mut self, minimum: i64) -> Self {
        self.minimum_iterations_below_maximum = minimum;
        self
    }

    pub fn with_maximum_iterations(mut self, maximum: i64) -> Self {
        self.maximum_iterations = maximum;
        self
    }

    pub fn with_divergence(mut self, maximum_relative_increase: f64, minimum_iterations: i64) -> Self {
        self.maximum_relative_increase = maximum_relative_increase;
        self.minimum_divergence_iterations = minimum_iterations;
        self
    }

    /// Checks every parameter without building anything.
    pub fn validate(&self) -> Result<(), StopError> {
        self.build::<f64>().map(|_| ())
    }

    pub fn build<S: Modulus>(&self) -> Result<CompositeStopCriterium<S>, StopError> {
        Ok(CompositeStopCriterium::new()
            .with(FailureStopCriterium::new())
            .with(DivergenceStopCriterium::new(
                self.maximum_relative_increase,
                self.minimum_divergence_iterations,
            )?)
            .with(IterationCountStopCriterium::new(self.maximum_iterations)?)
            .with(ResidualStopCriterium::new(
                self.maximum_residual,
                self.minimum_iterations_below_maximum,
            )?))
    }
}
