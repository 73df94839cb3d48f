//! Dense `faer` matrices and plain `Vec<T>` vectors as solver operands.
//!
//! The reference drivers in [`crate::solver`] are generic over [`MatVec`] and
//! [`InnerProduct`]; these impls let them run on `faer::Mat<T>` /
//! `faer::MatRef<T>` with `Vec<T>` vectors. Dot products are reduced with
//! `rayon` when the feature is enabled.

use crate::core::traits::{InnerProduct, MatVec};
use faer::{Mat, MatRef};
use num_traits::Float;

/// `y = A x` for a borrowed dense matrix.
impl<'a, T: Float> MatVec<Vec<T>> for MatRef<'a, T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        assert_eq!(self.ncols(), x.len(), "matvec: x has {} entries for {} columns", x.len(), self.ncols());
        assert_eq!(self.nrows(), y.len(), "matvec: y has {} entries for {} rows", y.len(), self.nrows());
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = x
                .iter()
                .enumerate()
                .fold(T::zero(), |acc, (j, &xj)| acc + self[(i, j)] * xj);
        }
    }
}

/// `y = A x` for an owned dense matrix.
impl<T: Float> MatVec<Vec<T>> for Mat<T> {
    fn matvec(&self, x: &Vec<T>, y: &mut Vec<T>) {
        self.as_ref().matvec(x, y)
    }
}

/// Real inner product over `Vec<T>`.
impl<T: Float + From<f64> + Send + Sync> InnerProduct<Vec<T>> for () {
    type Scalar = T;

    fn dot(&self, x: &Vec<T>, y: &Vec<T>) -> T {
        assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            x.par_iter()
                .zip(y.par_iter())
                .map(|(&xi, &yi)| xi * yi)
                .reduce(T::zero, |acc, v| acc + v)
        }
        #[cfg(not(feature = "rayon"))]
        {
            x.iter()
                .zip(y)
                .fold(T::zero(), |acc, (&xi, &yi)| acc + xi * yi)
        }
    }

    fn norm(&self, x: &Vec<T>) -> T {
        self.dot(x, x).sqrt()
    }
}
