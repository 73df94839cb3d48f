//! BiCGStab solver (Saad §7.1)

use tracing::debug;

use crate::config::StopOptions;
use crate::core::traits::{InnerProduct, MatVec, Modulus};
use crate::criterium::{CompositeStopCriterium, IterationStatus, StopCriterium};
use crate::error::StopError;
use crate::solver::{LinearSolver, SolveStats};

pub struct BiCgStabSolver<T: Modulus> {
    pub criterium: CompositeStopCriterium<T>,
    /// Hard cap on iterations, independent of the criteria.
    pub max_iters: usize,
}

impl<T: Modulus> BiCgStabSolver<T> {
    pub fn new(criterium: CompositeStopCriterium<T>, max_iters: usize) -> Self {
        Self { criterium, max_iters }
    }

    pub fn from_options(options: &StopOptions) -> Result<Self, StopError> {
        Ok(Self::new(options.build()?, options.maximum_iterations.max(1) as usize))
    }
}

impl<M, T> LinearSolver<M, Vec<T>> for BiCgStabSolver<T>
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

        // r0 = b - A x0
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
            debug!(status = ?stats.status, "bicgstab stopped before the first iteration");
            return Ok(stats);
        }

        let r_hat = r.clone(); // shadow residual
        let mut rho_prev = T::one();
        let mut alpha = T::one();
        let mut omega = T::one();
        let mut v = vec![T::zero(); n];
        let mut p = vec![T::zero(); n];
        let mut s = vec![T::zero(); n];
        let mut t = vec![T::zero(); n];

        for i in 1..=self.max_iters {
            // an exact solution stays put while the criteria catch up
            let exact = r.iter().all(|&rj| rj == T::zero());
            let mut stalled = false;
            if !exact {
                let rho = ip.dot(&r_hat, &r);
                if rho == T::zero() {
                    return Err(StopError::Breakdown(format!("rho = 0 at iteration {i}")));
                }
                let beta = (rho / rho_prev) * (alpha / omega);
                // p = r + beta * (p - omega * v)
                for ((pj, &rj), &vj) in p.iter_mut().zip(&r).zip(&v) {
                    *pj = rj + beta * (*pj - omega * vj);
                }
                a.matvec(&p, &mut v);
                let r_hat_v = ip.dot(&r_hat, &v);
                if r_hat_v == T::zero() {
                    return Err(StopError::Breakdown(format!("(r_hat, A p) = 0 at iteration {i}")));
                }
                alpha = rho / r_hat_v;
                // s = r - alpha * v
                for ((sj, &rj), &vj) in s.iter_mut().zip(&r).zip(&v) {
                    *sj = rj - alpha * vj;
                }

                a.matvec(&s, &mut t);
                let tt = ip.dot(&t, &t);
                if tt == T::zero() {
                    // A s = 0: for a regular A, x + alpha p solves the system
                    for (xj, &pj) in x.iter_mut().zip(&p) {
                        *xj = *xj + alpha * pj;
                    }
                    r.copy_from_slice(&s);
                    stalled = true;
                } else {
                    omega = ip.dot(&t, &s) / tt;
                    // x = x + alpha * p + omega * s
                    for ((xj, &pj), &sj) in x.iter_mut().zip(&p).zip(&s) {
                        *xj = *xj + alpha * pj + omega * sj;
                    }
                    // r = s - omega * t
                    for ((rj, &sj), &tj) in r.iter_mut().zip(&s).zip(&t) {
                        *rj = sj - omega * tj;
                    }
                    stalled = omega == T::zero();
                }
                rho_prev = rho;
            }

            let status = self.criterium.determine_status(i as i64, x.as_slice(), b, &r)?;
            stats = SolveStats {
                iterations: i,
                final_residual: ip.norm(&r),
                status,
            };
            if status.is_stop() {
                debug!(iterations = i, ?status, by = ?self.criterium.reported_by(status), "bicgstab stopped");
                return Ok(stats);
            }
            if stalled && r.iter().any(|&rj| rj != T::zero()) {
                return Err(StopError::Breakdown(format!("omega = 0 at iteration {i}")));
            }
        }
        debug!(max_iters = self.max_iters, "bicgstab hit the hard iteration cap");
        stats.status = IterationStatus::Continue;
        Ok(stats)
    }
}
