//! Relative-residual stop criterium with a hysteresis window.
//!
//! The criterium declares convergence once `‖r‖₂ / ‖b‖₂ <= maximum` has held
//! for at least `minimum_iterations_below_maximum` iterations. The window is
//! measured as a distance between iteration numbers, not as a number of calls,
//! so a driver that only evaluates every k-th iteration still converges once
//! enough solver iterations have passed below the threshold. Any rise above
//! the threshold restarts the window.
//!
//! NaN or infinite entries in the source or residual end the solve with
//! [`IterationStatus::Diverged`].
//!
//! The state machine lives in [`ResidualState::transition`], a pure function of
//! the previous state, the configuration and the inputs.
//! [`ResidualStopCriterium`] pairs a [`ResidualConfig`] with a
//! [`ResidualState`] to implement [`StopCriterium`].

use tracing::{debug, trace, warn};

use crate::core::norms::{ScaledNorm, all_finite};
use crate::core::traits::Modulus;
use crate::criterium::{IterationStatus, StopCriterium, check_inputs};
use crate::error::StopError;

/// Default relative residual threshold.
pub const DEFAULT_MAXIMUM_RESIDUAL: f64 = 1e-12;

/// Default hysteresis window: converge as soon as the threshold is reached.
pub const DEFAULT_MINIMUM_ITERATIONS_BELOW_MAXIMUM: usize = 0;

/// Validated configuration of a residual criterium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualConfig {
    maximum: f64,
    minimum_iterations_below_maximum: usize,
}

impl Default for ResidualConfig {
    fn default() -> Self {
        Self {
            maximum: DEFAULT_MAXIMUM_RESIDUAL,
            minimum_iterations_below_maximum: DEFAULT_MINIMUM_ITERATIONS_BELOW_MAXIMUM,
        }
    }
}

impl ResidualConfig {
    /// Configuration with the given threshold and hysteresis window.
    ///
    /// Fails if `maximum` is negative or NaN, or if
    /// `minimum_iterations_below_maximum` is negative.
    pub fn new(maximum: f64, minimum_iterations_below_maximum: i64) -> Result<Self, StopError> {
        Ok(Self {
            maximum: check_maximum(maximum)?,
            minimum_iterations_below_maximum: check_minimum_iterations(minimum_iterations_below_maximum)?,
        })
    }

    /// Relative residual threshold.
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Width of the hysteresis window in iterations.
    pub fn minimum_iterations_below_maximum(&self) -> usize {
        self.minimum_iterations_below_maximum
    }
}

fn check_maximum(maximum: f64) -> Result<f64, StopError> {
    // NaN fails the comparison too
    if maximum >= 0.0 {
        Ok(maximum)
    } else {
        Err(StopError::invalid("maximum", maximum, ">= 0"))
    }
}

fn check_minimum_iterations(minimum: i64) -> Result<usize, StopError> {
    usize::try_from(minimum)
        .map_err(|_| StopError::invalid("minimum_iterations_below_maximum", minimum, ">= 0"))
}

/// `‖residual‖₂ / ‖source‖₂`.
///
/// A zero source gives 0 for a zero residual and `+inf` otherwise. Both
/// norms are kept scaled, so finite inputs give the true quotient even when
/// the norms themselves would overflow or underflow.
pub fn relative_residual<S: Modulus>(source: &[S], residual: &[S]) -> f64 {
    ScaledNorm::of(residual).ratio(&ScaledNorm::of(source))
}

/// Run-state of a residual criterium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResidualState {
    crossing: Option<i64>,
    status: IterationStatus,
}

impl ResidualState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> IterationStatus {
        self.status
    }

    /// Iteration at which the ratio last dropped to or below the threshold,
    /// if it has stayed there since.
    pub fn crossing_iteration(&self) -> Option<i64> {
        self.crossing
    }

    /// Computes the next state and the status for one evaluation.
    ///
    /// Input-contract checks are the caller's job; this function assumes
    /// `iteration >= 0` and equal-length vectors.
    pub fn transition<S: Modulus>(
        self,
        config: &ResidualConfig,
        iteration: i64,
        source: &[S],
        residual: &[S],
    ) -> (ResidualState, IterationStatus) {
        if !all_finite(source) || !all_finite(residual) {
            warn!(iteration, "non-finite value in source or residual");
            let next = ResidualState {
                crossing: self.crossing,
                status: IterationStatus::Diverged,
            };
            return (next, next.status);
        }

        let ratio = relative_residual(source, residual);
        trace!(iteration, ratio, maximum = config.maximum, "relative residual");

        let next = if ratio <= config.maximum {
            let crossing = match self.crossing {
                Some(c) => c,
                None => {
                    debug!(iteration, ratio, "relative residual reached threshold");
                    iteration
                }
            };
            let below_for = iteration - crossing;
            let status = if below_for >= config.minimum_iterations_below_maximum as i64 {
                if self.status != IterationStatus::Converged {
                    debug!(iteration, crossing, ratio, "converged");
                }
                IterationStatus::Converged
            } else {
                IterationStatus::Continue
            };
            ResidualState {
                crossing: Some(crossing),
                status,
            }
        } else {
            if let Some(crossing) = self.crossing {
                debug!(iteration, crossing, ratio, "relative residual rose above threshold");
            }
            ResidualState {
                crossing: None,
                status: IterationStatus::Continue,
            }
        };
        (next, next.status)
    }
}

/// Stop criterium on the relative residual `‖r‖₂ / ‖b‖₂`.
///
/// Cloning copies the configuration only; the clone starts with empty
/// run-state.
#[derive(Debug, Default)]
pub struct ResidualStopCriterium {
    config: ResidualConfig,
    state: ResidualState,
}

impl Clone for ResidualStopCriterium {
    fn clone(&self) -> Self {
        Self::from_config(self.config)
    }
}

impl ResidualStopCriterium {
    /// Criterium with the given threshold and hysteresis window.
    ///
    /// Fails if `maximum` is negative or NaN, or if
    /// `minimum_iterations_below_maximum` is negative.
    pub fn new(maximum: f64, minimum_iterations_below_maximum: i64) -> Result<Self, StopError> {
        Ok(Self::from_config(ResidualConfig::new(maximum, minimum_iterations_below_maximum)?))
    }

    /// Criterium with the given threshold and the default window.
    pub fn with_maximum(maximum: f64) -> Result<Self, StopError> {
        Self::new(maximum, DEFAULT_MINIMUM_ITERATIONS_BELOW_MAXIMUM as i64)
    }

    /// Criterium with the default threshold and the given window.
    pub fn with_minimum_iterations(minimum_iterations_below_maximum: i64) -> Result<Self, StopError> {
        Self::new(DEFAULT_MAXIMUM_RESIDUAL, minimum_iterations_below_maximum)
    }

    pub fn from_config(config: ResidualConfig) -> Self {
        Self {
            config,
            state: ResidualState::new(),
        }
    }

    pub fn config(&self) -> &ResidualConfig {
        &self.config
    }

    pub fn maximum(&self) -> f64 {
        self.config.maximum
    }

    pub fn set_maximum(&mut self, maximum: f64) -> Result<(), StopError> {
        self.config.maximum = check_maximum(maximum)?;
        Ok(())
    }

    pub fn reset_maximum_to_default(&mut self) {
        self.config.maximum = DEFAULT_MAXIMUM_RESIDUAL;
    }

    pub fn minimum_iterations_below_maximum(&self) -> usize {
        self.config.minimum_iterations_below_maximum
    }

    pub fn set_minimum_iterations_below_maximum(&mut self, minimum: i64) -> Result<(), StopError> {
        self.config.minimum_iterations_below_maximum = check_minimum_iterations(minimum)?;
        Ok(())
    }

    pub fn reset_minimum_iterations_below_maximum_to_default(&mut self) {
        self.config.minimum_iterations_below_maximum = DEFAULT_MINIMUM_ITERATIONS_BELOW_MAXIMUM;
    }

    pub fn crossing_iteration(&self) -> Option<i64> {
        self.state.crossing
    }

    pub fn status(&self) -> IterationStatus {
        self.state.status
    }

    pub fn reset(&mut self) {
        self.state = ResidualState::new();
    }

    /// See [`StopCriterium::determine_status`]. The solution vector only takes
    /// part in the length check.
    pub fn determine_status<S: Modulus>(
        &mut self,
        iteration: i64,
        solution: &[S],
        source: &[S],
        residual: &[S],
    ) -> Result<IterationStatus, StopError> {
        check_inputs(iteration, solution, source, residual)?;
        let (next, status) = self.state.transition(&self.config, iteration, source, residual);
        self.state = next;
        Ok(status)
    }
}

impl<S: Modulus> StopCriterium<S> for ResidualStopCriterium {
    fn determine_status(
        &mut self,
        iteration: i64,
        solution: &[S],
        source: &[S],
        residual: &[S],
    ) -> Result<IterationStatus, StopError> {
        ResidualStopCriterium::determine_status(self, iteration, solution, source, residual)
    }

    fn reset(&mut self) {
        ResidualStopCriterium::reset(self)
    }

    fn status(&self) -> IterationStatus {
        self.state.status
    }

    fn clone_fresh(&self) -> Box<dyn StopCriterium<S>> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "residual"
    }
}
