//! Reference Krylov drivers that consume the stop-criteria contract.
//!
//! Each driver recomputes the residual `r = b - A x` every iteration, hands
//! `(i, x, b, r)` to its [`CompositeStopCriterium`] and stops as soon as the
//! verdict is not `Continue`. The criterium is reset at the start of every
//! solve, so one solver value can be reused across systems.
//!
//! [`CompositeStopCriterium`]: crate::criterium::CompositeStopCriterium

use crate::criterium::IterationStatus;

/// Common interface for the iterative drivers.
pub trait LinearSolver<M, V> {
    type Error;
    type Scalar;
    /// Solve A·x = b, using `x` as the initial guess and writing the result
    /// into it.
    fn solve(&mut self, a: &M, b: &V, x: &mut V) -> Result<SolveStats<Self::Scalar>, Self::Error>;
}

/// Outcome of a solve.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveStats<T> {
    /// Last iteration evaluated by the stop criterium.
    pub iterations: usize,
    /// ‖b - A x‖₂ at that iteration.
    pub final_residual: T,
    /// Verdict that ended the solve; `Continue` if the hard iteration cap was
    /// reached first.
    pub status: IterationStatus,
}

impl<T> SolveStats<T> {
    pub fn converged(&self) -> bool {
        self.status == IterationStatus::Converged
    }
}

pub mod bicgstab;
pub use bicgstab::BiCgStabSolver;

pub mod cg;
pub use cg::CgSolver;
