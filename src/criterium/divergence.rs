//! Detects a residual that keeps growing.
//!
//! The criterium remembers the last `minimum_number_of_iterations + 1`
//! residual norms. Once that history is full, the solve is declared
//! [`IterationStatus::Diverged`] if every step in it grew the residual by at
//! least `maximum_relative_increase` (relative to the previous norm). A single
//! step that grows less, or shrinks, keeps the solve going.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::core::norms::{all_finite, euclidean_norm};
use crate::core::traits::Modulus;
use crate::criterium::{IterationStatus, StopCriterium, check_inputs};
use crate::error::StopError;

pub const DEFAULT_MAXIMUM_RELATIVE_INCREASE: f64 = 0.08;
pub const DEFAULT_MINIMUM_NUMBER_OF_ITERATIONS: usize = 10;

#[derive(Debug)]
pub struct DivergenceStopCriterium {
    maximum_relative_increase: f64,
    minimum_iterations: usize,
    history: VecDeque<f64>,
    last_iteration: Option<i64>,
    status: IterationStatus,
}

impl Default for DivergenceStopCriterium {
    fn default() -> Self {
        Self::from_parts(DEFAULT_MAXIMUM_RELATIVE_INCREASE, DEFAULT_MINIMUM_NUMBER_OF_ITERATIONS)
    }
}

impl Clone for DivergenceStopCriterium {
    fn clone(&self) -> Self {
        Self::from_parts(self.maximum_relative_increase, self.minimum_iterations)
    }
}

fn check_increase(increase: f64) -> Result<f64, StopError> {
    if increase > 0.0 && increase.is_finite() {
        Ok(increase)
    } else {
        Err(StopError::invalid("maximum_relative_increase", increase, "finite and > 0"))
    }
}

fn check_minimum(minimum: i64) -> Result<usize, StopError> {
    match usize::try_from(minimum) {
        Ok(m) if m >= 1 => Ok(m),
        _ => Err(StopError::invalid("minimum_number_of_iterations", minimum, ">= 1")),
    }
}

impl DivergenceStopCriterium {
    pub fn new(maximum_relative_increase: f64, minimum_number_of_iterations: i64) -> Result<Self, StopError> {
        Ok(Self::from_parts(
            check_increase(maximum_relative_increase)?,
            check_minimum(minimum_number_of_iterations)?,
        ))
    }

    fn from_parts(maximum_relative_increase: f64, minimum_iterations: usize) -> Self {
        Self {
            maximum_relative_increase,
            minimum_iterations,
            history: VecDeque::with_capacity(minimum_iterations + 1),
            last_iteration: None,
            status: IterationStatus::Continue,
        }
    }

    pub fn maximum_relative_increase(&self) -> f64 {
        self.maximum_relative_increase
    }

    pub fn set_maximum_relative_increase(&mut self, increase: f64) -> Result<(), StopError> {
        self.maximum_relative_increase = check_increase(increase)?;
        Ok(())
    }

    pub fn reset_maximum_relative_increase_to_default(&mut self) {
        self.maximum_relative_increase = DEFAULT_MAXIMUM_RELATIVE_INCREASE;
    }

    pub fn minimum_number_of_iterations(&self) -> usize {
        self.minimum_iterations
    }

    /// Changing the window discards the recorded history.
    pub fn set_minimum_number_of_iterations(&mut self, minimum: i64) -> Result<(), StopError> {
        self.minimum_iterations = check_minimum(minimum)?;
        self.history.clear();
        Ok(())
    }

    pub fn reset_minimum_number_of_iterations_to_default(&mut self) {
        self.minimum_iterations = DEFAULT_MINIMUM_NUMBER_OF_ITERATIONS;
        self.history.clear();
    }

    pub fn status(&self) -> IterationStatus {
        self.status
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last_iteration = None;
        self.status = IterationStatus::Continue;
    }

    fn is_diverging(&self) -> bool {
        self.history.len() > self.minimum_iterations
            && self
                .history
                .iter()
                .zip(self.history.iter().skip(1))
                .all(|(&prev, &next)| next > prev && next - prev >= self.maximum_relative_increase * prev)
    }

    pub fn determine_status<S: Modulus>(
        &mut self,
        iteration: i64,
        solution: &[S],
        source: &[S],
        residual: &[S],
    ) -> Result<IterationStatus, StopError> {
        check_inputs(iteration, solution, source, residual)?;

        if !all_finite(residual) {
            warn!(iteration, "non-finite value in residual");
            self.status = IterationStatus::Diverged;
            return Ok(self.status);
        }

        // iteration numbers going backwards mean a new solve started
        if self.last_iteration.is_some_and(|last| iteration <= last) {
            self.history.clear();
        }
        self.last_iteration = Some(iteration);

        if self.history.len() > self.minimum_iterations {
            self.history.pop_front();
        }
        self.history.push_back(euclidean_norm(residual));

        self.status = if self.is_diverging() {
            debug!(iteration, window = self.minimum_iterations, "residual grew over the whole window");
            IterationStatus::Diverged
        } else {
            IterationStatus::Continue
        };
        Ok(self.status)
    }
}

impl<S: Modulus> StopCriterium<S> for DivergenceStopCriterium {
    fn determine_status(
        &mut self,
        iteration: i64,
        solution: &[S],
        source: &[S],
        residual: &[S],
    ) -> Result<IterationStatus, StopError> {
        DivergenceStopCriterium::determine_status(self, iteration, solution, source, residual)
    }

    fn reset(&mut self) {
        DivergenceStopCriterium::reset(self)
    }

    fn status(&self) -> IterationStatus {
        self.status
    }

    fn clone_fresh(&self) -> Box<dyn StopCriterium<S>> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "divergence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(crit: &mut DivergenceStopCriterium, norms: &[f64]) -> Vec<IterationStatus> {
        norms
            .iter()
            .enumerate()
            .map(|(i, &r)| crit.determine_status(i as i64, &[0.0], &[1.0_f64], &[r]).unwrap())
            .collect()
    }

    #[test]
    fn needs_full_window_of_growth() {
        let mut crit = DivergenceStopCriterium::new(0.5, 3).unwrap();
        use IterationStatus::*;
        // each step doubles; window of 3 steps needs 4 samples
        assert_eq!(run(&mut crit, &[1.0, 2.0, 4.0, 8.0]), [Continue, Continue, Continue, Diverged]);
    }

    #[test]
    fn slow_growth_is_tolerated() {
        let mut crit = DivergenceStopCriterium::new(0.5, 2).unwrap();
        let got = run(&mut crit, &[1.0, 1.1, 1.2, 1.3, 1.4]);
        assert!(got.iter().all(|s| s.is_continue()));
    }

    #[test]
    fn one_shrinking_step_breaks_the_run() {
        let mut crit = DivergenceStopCriterium::new(0.5, 2).unwrap();
        use IterationStatus::*;
        assert_eq!(
            run(&mut crit, &[1.0, 2.0, 1.0, 2.0, 4.0]),
            [Continue, Continue, Continue, Continue, Diverged]
        );
    }

    #[test]
    fn restarting_iteration_numbers_clears_history() {
        let mut crit = DivergenceStopCriterium::new(0.5, 2).unwrap();
        run(&mut crit, &[1.0, 2.0]);
        // starts over at iteration 0
        let got = run(&mut crit, &[4.0, 8.0]);
        assert!(got.iter().all(|s| s.is_continue()));
    }

    #[test]
    fn flat_zero_residual_is_not_growth() {
        let mut crit = DivergenceStopCriterium::new(0.5, 2).unwrap();
        let got = run(&mut crit, &[0.0, 0.0, 0.0, 0.0]);
        assert!(got.iter().all(|s| s.is_continue()));
    }

    #[test]
    fn nan_residual_diverges() {
        let mut crit = DivergenceStopCriterium::default();
        let status = crit.determine_status(0, &[0.0], &[1.0_f64], &[f64::NAN]).unwrap();
        assert_eq!(status, IterationStatus::Diverged);
    }

    #[test]
    fn configuration_is_validated() {
        assert!(DivergenceStopCriterium::new(0.0, 3).is_err());
        assert!(DivergenceStopCriterium::new(f64::NAN, 3).is_err());
        assert!(DivergenceStopCriterium::new(0.1, 0).is_err());
        let mut crit = DivergenceStopCriterium::new(0.2, 4).unwrap();
        crit.reset_maximum_relative_increase_to_default();
        crit.reset_minimum_number_of_iterations_to_default();
        assert_eq!(crit.maximum_relative_increase(), DEFAULT_MAXIMUM_RELATIVE_INCREASE);
        assert_eq!(crit.minimum_number_of_iterations(), DEFAULT_MINIMUM_NUMBER_OF_ITERATIONS);
    }
}
