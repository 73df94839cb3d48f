//! Stop criteria for iterative solvers.
//!
//! Every criterium implements [`StopCriterium`]: once per solver iteration the
//! driver hands over the iteration number together with the current solution,
//! the source (right-hand side) and the residual `r = b - A x`, and gets back an
//! [`IterationStatus`]. Misuse of that contract (negative iteration numbers,
//! vectors of different lengths, bad configuration) is an error; a solve that
//! blows up numerically is not, and is reported as [`IterationStatus::Diverged`].
//!
//! Criteria keep per-solve run-state. [`StopCriterium::reset`] clears it and
//! [`StopCriterium::clone_fresh`] hands out a new instance with the same
//! configuration and empty run-state, which is what a concurrent solve should
//! use instead of sharing an instance.
//!
//! Available criteria:
//! - [`ResidualStopCriterium`]: relative residual below a threshold for a
//!   minimum span of iterations.
//! - [`IterationCountStopCriterium`]: iteration budget.
//! - [`DivergenceStopCriterium`]: residual growing steadily over a window.
//! - [`FailureStopCriterium`]: NaN/Infinity in the residual or solution.
//! - [`CompositeStopCriterium`]: any combination of the above.

use crate::core::traits::Modulus;
use crate::error::StopError;

pub mod composite;
pub mod divergence;
pub mod failure;
pub mod iteration_count;
pub mod residual;

pub use composite::CompositeStopCriterium;
pub use divergence::DivergenceStopCriterium;
pub use failure::FailureStopCriterium;
pub use iteration_count::IterationCountStopCriterium;
pub use residual::{ResidualConfig, ResidualState, ResidualStopCriterium};

/// Verdict of a stop criterium for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IterationStatus {
    /// Keep iterating.
    #[default]
    Continue,
    /// The solution is good enough; stop and report success.
    Converged,
    /// The solve failed; stop and report the failure.
    Diverged,
}

impl IterationStatus {
    pub fn is_continue(self) -> bool {
        self == IterationStatus::Continue
    }

    /// True for any status that should end the solve.
    pub fn is_stop(self) -> bool {
        !self.is_continue()
    }
}

/// Contract shared by all stop criteria.
///
/// Implementations are not meant to be shared between concurrent solves;
/// `determine_status` takes `&mut self` for that reason.
pub trait StopCriterium<S: Modulus>: Send {
    /// Evaluates the criterium for `iteration` and records the result as the
    /// current status.
    ///
    /// `iteration` must be non-negative and the three vectors must have the
    /// same length. Within one solve, iteration numbers are expected to be
    /// non-decreasing.
    fn determine_status(
        &mut self,
        iteration: i64,
        solution: &[S],
        source: &[S],
        residual: &[S],
    ) -> Result<IterationStatus, StopError>;

    /// Clears run-state; the status goes back to `Continue`.
    fn reset(&mut self);

    /// Status produced by the last evaluation.
    fn status(&self) -> IterationStatus;

    /// New instance with the same configuration and empty run-state.
    fn clone_fresh(&self) -> Box<dyn StopCriterium<S>>;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Validates the parts of the evaluation contract every criterium shares.
pub fn check_inputs<S>(
    iteration: i64,
    solution: &[S],
    source: &[S],
    residual: &[S],
) -> Result<(), StopError> {
    if iteration < 0 {
        return Err(StopError::NegativeIteration(iteration));
    }
    if solution.len() != source.len() || solution.len() != residual.len() {
        return Err(StopError::LengthMismatch {
            solution_len: solution.len(),
            source_len: source.len(),
            residual_len: residual.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_continue() {
        assert_eq!(IterationStatus::default(), IterationStatus::Continue);
        assert!(IterationStatus::Continue.is_continue());
        assert!(IterationStatus::Converged.is_stop());
        assert!(IterationStatus::Diverged.is_stop());
    }

    #[test]
    fn check_inputs_rejects_every_mismatched_pair() {
        let a = [1.0_f64; 3];
        let b = [1.0_f64; 4];
        assert!(check_inputs(0, &a, &a, &a).is_ok());
        for (x, y, z) in [(&b[..], &a[..], &a[..]), (&a[..], &b[..], &a[..]), (&a[..], &a[..], &b[..])] {
            let err = check_inputs(1, x, y, z).unwrap_err();
            assert!(err.is_input_contract());
            assert!(matches!(err, StopError::LengthMismatch { .. }));
        }
    }

    #[test]
    fn check_inputs_rejects_negative_iteration() {
        let a = [0.0_f64; 2];
        assert_eq!(check_inputs(-1, &a, &a, &a), Err(StopError::NegativeIteration(-1)));
    }
}
