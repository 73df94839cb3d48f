//! Iteration budget.

use tracing::debug;

use crate::core::traits::Modulus;
use crate::criterium::{IterationStatus, StopCriterium, check_inputs};
use crate::error::StopError;

pub const DEFAULT_MAXIMUM_NUMBER_OF_ITERATIONS: usize = 1000;

/// Reports [`IterationStatus::Diverged`] once the iteration number reaches
/// the budget: the solver ran out of iterations without converging.
#[derive(Debug)]
pub struct IterationCountStopCriterium {
    maximum: usize,
    status: IterationStatus,
}

impl Default for IterationCountStopCriterium {
    fn default() -> Self {
        Self {
            maximum: DEFAULT_MAXIMUM_NUMBER_OF_ITERATIONS,
            status: IterationStatus::Continue,
        }
    }
}

impl Clone for IterationCountStopCriterium {
    fn clone(&self) -> Self {
        Self {
            maximum: self.maximum,
            status: IterationStatus::Continue,
        }
    }
}

fn check_maximum(maximum: i64) -> Result<usize, StopError> {
    match usize::try_from(maximum) {
        Ok(m) if m >= 1 => Ok(m),
        _ => Err(StopError::invalid("maximum_number_of_iterations", maximum, ">= 1")),
    }
}

impl IterationCountStopCriterium {
    pub fn new(maximum_number_of_iterations: i64) -> Result<Self, StopError> {
        Ok(Self {
            maximum: check_maximum(maximum_number_of_iterations)?,
            status: IterationStatus::Continue,
        })
    }

    pub fn maximum_number_of_iterations(&self) -> usize {
        self.maximum
    }

    pub fn set_maximum_number_of_iterations(&mut self, maximum: i64) -> Result<(), StopError> {
        self.maximum = check_maximum(maximum)?;
        Ok(())
    }

    pub fn reset_maximum_number_of_iterations_to_default(&mut self) {
        self.maximum = DEFAULT_MAXIMUM_NUMBER_OF_ITERATIONS;
    }

    pub fn status(&self) -> IterationStatus {
        self.status
    }

    pub fn reset(&mut self) {
        self.status = IterationStatus::Continue;
    }

    pub fn determine_status<S: Modulus>(
        &mut self,
        iteration: i64,
        solution: &[S],
        source: &[S],
        residual: &[S],
    ) -> Result<IterationStatus, StopError> {
        check_inputs(iteration, solution, source, residual)?;
        self.status = if iteration as u64 >= self.maximum as u64 {
            if self.status != IterationStatus::Diverged {
                debug!(iteration, maximum = self.maximum, "iteration budget exhausted");
            }
            IterationStatus::Diverged
        } else {
            IterationStatus::Continue
        };
        Ok(self.status)
    }
}

impl<S: Modulus> StopCriterium<S> for IterationCountStopCriterium {
    fn determine_status(
        &mut self,
        iteration: i64,
        solution: &[S],
        source: &[S],
        residual: &[S],
    ) -> Result<IterationStatus, StopError> {
        IterationCountStopCriterium::determine_status(self, iteration, solution, source, residual)
    }

    fn reset(&mut self) {
        IterationCountStopCriterium::reset(self)
    }

    fn status(&self) -> IterationStatus {
        self.status
    }

    fn clone_fresh(&self) -> Box<dyn StopCriterium<S>> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "iteration-count"
    }
}
