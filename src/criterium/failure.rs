//! Numeric failure: NaN or infinity in the residual or the solution.

use tracing::warn;

use crate::core::norms::all_finite;
use crate::core::traits::Modulus;
use crate::criterium::{IterationStatus, StopCriterium, check_inputs};
use crate::error::StopError;

#[derive(Debug, Default)]
pub struct FailureStopCriterium {
    status: IterationStatus,
}

impl Clone for FailureStopCriterium {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl FailureStopCriterium {
    pub fn new() -> Self {
        Self::default()
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
        self.status = if all_finite(residual) && all_finite(solution) {
            IterationStatus::Continue
        } else {
            warn!(iteration, "non-finite value in residual or solution");
            IterationStatus::Diverged
        };
        Ok(self.status)
    }
}

impl<S: Modulus> StopCriterium<S> for FailureStopCriterium {
    fn determine_status(
        &mut self,
        iteration: i64,
        solution: &[S],
        source: &[S],
        residual: &[S],
    ) -> Result<IterationStatus, StopError> {
        FailureStopCriterium::determine_status(self, iteration, solution, source, residual)
    }

    fn reset(&mut self) {
        FailureStopCriterium::reset(self)
    }

    fn status(&self) -> IterationStatus {
        self.status
    }

    fn clone_fresh(&self) -> Box<dyn StopCriterium<S>> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "failure"
    }
}
