//! Conjugate Gradient (unpreconditioned) per Saad §6.1.

use tracing::debug;

use crate::config::StopOptions;
use crate::core::traits::{InnerProduct, MatVec, Modulus};
use crate::criterium::{CompositeStopCriterium, IterationStatus, StopCriterium};
use crate::error::StopError;
use crate::solver::{LinearSolver, SolveStats};

pub struct CgSolver<T: Modulus> {
    pub criterium: CompositeStopCriterium<T>,
    /// Hard cap on iterations, independent of the criteria.
    pub max_iters: usize,
}

impl<T: Modulus> CgSolver<T> {
    pub fn new(criterium: CompositeStopCriterium<T>, max_iters: usize) -> Self {
        Self { criterium, max_iters }
    }

    /// Solver driven by the standard criteria built from `options`.
    pub fn from_options(options: &StopOptions) -> Result<Self, StopError> {
        Ok(Self::new(options.build()?, options.maximum_iterations.max(1) as usize))
    }
}

impl<M, T> LinearSolver<M, Vec<T>> for CgSolver<T>
where
    M: MatVec<Vec<T>>,
    (): InnerProduct<Vec<T>, Scalar = T>,
    T: num_traits::Float + Modulus,
{
    type Error = StopError;
    type Scalar = T;

    fn solve(&mut self, a: &M, b: &Vec<T>, x: &mut Vec<T>) -> Result<SolveStats<T>, StopError> {
        let n = b.len();
        let ip = ();
        self.criterium.reset();

        let mut r = vec![T::zero(); n];
        a.matvec(x, &mut r);
        for (ri, &bi) in r.iter_mut().zip(b) {
            *ri = bi - *ri;
        }

        let mut stats = SolveStats {
            iterations: 0,
            final_residual: ip.norm(&r),
            status: self.criterium.determine_status(0, x.as_slice(), b, &r)?,
        };
        if stats.status.is_stop() {
            debug!(status = ?stats.status, "cg stopped before the first iteration");
            return Ok(stats);
        }

        let mut p = r.clone();
        let mut ap = vec![T::zero(); n];
        let mut rsq = ip.dot(&r, &r);

        for i in 1..=self.max_iters {
            // an exact solution stays put while the criteria catch up
            if rsq != T::zero() {
                a.matvec(&p, &mut ap);
                let pap = ip.dot(&p, &ap);
                if pap == T::zero() {
                    return Err(StopError::Breakdown(format!("p^T A p = 0 at iteration {i}")));
                }
                let alpha = rsq / pap;
                for (xj, &pj) in x.iter_mut().zip(&p) {
                    *xj = *xj + alpha * pj;
                }
                for (rj, &apj) in r.iter_mut().zip(&ap) {
                    *rj = *rj - alpha * apj;
                }
            }

            let status = self.criterium.determine_status(i as i64, x.as_slice(), b, &r)?;
            stats = SolveStats {
                iterations: i,
                final_residual: ip.norm(&r),
                status,
            };
            if status.is_stop() {
                debug!(iterations = i, ?status, by = ?self.criterium.reported_by(status), "cg stopped");
                return Ok(stats);
            }

            let rsq_new = ip.dot(&r, &r);
            if rsq_new != T::zero() {
                let beta = rsq_new / rsq;
                for (pj, &rj) in p.iter_mut().zip(&r) {
                    *pj = rj + beta * *pj;
                }
            }
            rsq = rsq_new;
        }
        debug!(max_iters = self.max_iters, "cg hit the hard iteration cap");
        stats.status = IterationStatus::Continue;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Simple dense matrix type for testing
    struct DenseMat {
        data: Vec<Vec<f64>>,
    }
    impl MatVec<Vec<f64>> for DenseMat {
        fn matvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
            for (i, row) in self.data.iter().enumerate() {
                y[i] = row.iter().zip(x.iter()).map(|(a, b)| a * b).sum();
            }
        }
    }

    fn options(tol: f64) -> StopOptions {
        StopOptions::default().with_maximum_residual(tol).with_maximum_iterations(100)
    }

    #[test]
    fn cg_solves_simple_spd() {
        // SPD system: [[4,1],[1,3]] x = [1,2]
        let a = DenseMat { data: vec![vec![4.0, 1.0], vec![1.0, 3.0]] };
        let b = vec![1.0, 2.0];
        let mut x = vec![0.0, 0.0];
        let mut solver = CgSolver::from_options(&options(1e-10)).unwrap();
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        let expected = [0.09090909090909091, 0.6363636363636364];
        for (xi, ei) in x.iter().zip(expected.iter()) {
            assert!((xi - ei).abs() < 1e-8, "xi = {}, expected = {}", xi, ei);
        }
        assert!(stats.converged(), "CG did not converge: {:?}", stats);
        assert!(stats.iterations <= 2);
    }

    #[test]
    fn exact_initial_guess_converges_at_iteration_zero() {
        let a = DenseMat { data: vec![vec![2.0, 0.0], vec![0.0, 2.0]] };
        let b = vec![2.0, 4.0];
        let mut x = vec![1.0, 2.0];
        let mut solver = CgSolver::from_options(&StopOptions::default()).unwrap();
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        assert_eq!(stats.iterations, 0);
        assert!(stats.converged());
    }

    #[test]
    fn nan_right_hand_side_diverges() {
        let a = DenseMat { data: vec![vec![1.0, 0.0], vec![0.0, 1.0]] };
        let b = vec![1.0, f64::NAN];
        let mut x = vec![0.0, 0.0];
        let mut solver = CgSolver::from_options(&StopOptions::default()).unwrap();
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        assert_eq!(stats.status, IterationStatus::Diverged);
        assert_eq!(stats.iterations, 0);
    }

    #[test]
    fn iteration_budget_reports_diverged() {
        let n: usize = 20;
        let data = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| if i == j { 4.0 } else if i.abs_diff(j) == 1 { -1.0 } else { 0.0 })
                    .collect::<Vec<f64>>()
            })
            .collect();
        let a = DenseMat { data };
        let b = (0..n).map(|i| 1.0 + i as f64).collect::<Vec<_>>();
        let mut x = vec![0.0; n];
        let mut solver = CgSolver::from_options(&options(1e-12).with_maximum_iterations(2)).unwrap();
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        assert_eq!(stats.status, IterationStatus::Diverged);
        assert_eq!(stats.iterations, 2);
        assert_eq!(solver.criterium.reported_by(IterationStatus::Diverged), Some("iteration-count"));
    }

    #[test]
    fn exact_solution_waits_out_the_window() {
        let a = DenseMat { data: vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]] };
        let b = vec![1.0, 2.0, 3.0];
        let mut x = vec![0.0; 3];
        let options = StopOptions::default().with_minimum_iterations_below_maximum(2);
        let mut solver = CgSolver::from_options(&options).unwrap();
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        assert_eq!(stats.status, IterationStatus::Converged);
        // exact after one step, then two more below the threshold
        assert_eq!(stats.iterations, 3);
        assert_eq!(stats.final_residual, 0.0);
        assert_eq!(x, b);
    }

    #[test]
    fn hard_cap_leaves_status_continue() {
        let a = DenseMat { data: vec![vec![4.0, 1.0], vec![1.0, 3.0]] };
        let b = vec![1.0, 2.0];
        let mut x = vec![0.0, 0.0];
        let criterium = CompositeStopCriterium::new()
            .with(crate::criterium::ResidualStopCriterium::with_maximum(0.0).unwrap());
        let mut solver = CgSolver::new(criterium, 1);
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        assert_eq!(stats.iterations, 1);
        assert_eq!(stats.status, IterationStatus::Continue);
    }
}
