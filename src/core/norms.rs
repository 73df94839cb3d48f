//! Euclidean norm and finiteness scans over real or complex slices.
//!
//! Both kernels run sequentially for short vectors. With the `rayon` feature
//! enabled, vectors of at least [`PARALLEL_MIN_LEN`] entries are reduced in
//! parallel; the result then differs from the sequential one only by
//! floating-point summation order.

use crate::core::traits::Modulus;

/// Length from which the `rayon` reductions kick in.
pub const PARALLEL_MIN_LEN: usize = 1 << 14;

/// Sum of squares kept as `scale² · ssq`, after the LAPACK `dnrm2`
/// recurrence.
///
/// `scale` is the largest magnitude seen so far and every other entry enters
/// `ssq` divided by it, so no square is ever formed of an entry far from
/// `scale`. Norms whose squares would overflow or underflow an `f64` stay
/// representable, and two of them can be compared through [`ratio`](Self::ratio)
/// even when the norms themselves lie outside the `f64` range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledNorm {
    scale: f64,
    ssq: f64,
}

impl Default for ScaledNorm {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ScaledNorm {
    /// Norm of the empty vector.
    pub const ZERO: ScaledNorm = ScaledNorm { scale: 0.0, ssq: 1.0 };

    /// Scaled sum of squares of every entry of `x`.
    pub fn of<S: Modulus>(x: &[S]) -> Self {
        #[cfg(feature = "rayon")]
        {
            if x.len() >= PARALLEL_MIN_LEN {
                use rayon::prelude::*;
                return x
                    .par_iter()
                    .fold(|| Self::ZERO, |acc, &xi| acc.push(xi))
                    .reduce(|| Self::ZERO, Self::merge);
            }
        }
        x.iter().fold(Self::ZERO, |acc, &xi| acc.push(xi))
    }

    /// Adds one entry; both parts of a complex entry count as components.
    #[inline]
    pub fn push<S: Modulus>(self, xi: S) -> Self {
        let (re, im) = xi.abs_parts();
        self.push_component(re).push_component(im)
    }

    #[inline]
    fn push_component(mut self, v: f64) -> Self {
        if v != 0.0 {
            if self.scale < v {
                let q = self.scale / v;
                self.ssq = 1.0 + self.ssq * q * q;
                self.scale = v;
            } else {
                let q = v / self.scale;
                self.ssq += q * q;
            }
        }
        self
    }

    /// Sum of squares of the concatenation of two partial vectors.
    pub fn merge(self, other: Self) -> Self {
        if other.scale == 0.0 {
            return self;
        }
        if self.scale == 0.0 {
            return other;
        }
        let (big, small) = if self.scale >= other.scale { (self, other) } else { (other, self) };
        let q = small.scale / big.scale;
        Self {
            scale: big.scale,
            ssq: big.ssq + small.ssq * q * q,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.scale == 0.0
    }

    /// ‖x‖₂; `+inf` if the norm exceeds the `f64` range.
    pub fn value(&self) -> f64 {
        self.scale * self.ssq.sqrt()
    }

    /// `self / denominator` computed from the scaled parts.
    ///
    /// Overflows to `+inf` or underflows to 0 only when the quotient itself
    /// does. A zero denominator gives 0 for a zero numerator and `+inf`
    /// otherwise.
    pub fn ratio(&self, denominator: &ScaledNorm) -> f64 {
        if denominator.is_zero() {
            return if self.is_zero() { 0.0 } else { f64::INFINITY };
        }
        (self.scale / denominator.scale) * (self.ssq / denominator.ssq).sqrt()
    }
}

/// ‖x‖₂ = sqrt(Σ |xᵢ|²), accumulated in `f64` without intermediate overflow
/// or underflow.
pub fn euclidean_norm<S: Modulus>(x: &[S]) -> f64 {
    ScaledNorm::of(x).value()
}

/// True when no entry of `x` is NaN or infinite.
pub fn all_finite<S: Modulus>(x: &[S]) -> bool {
    #[cfg(feature = "rayon")]
    {
        if x.len() >= PARALLEL_MIN_LEN {
            use rayon::prelude::*;
            return x.par_iter().all(|xi| xi.is_finite_value());
        }
    }
    x.iter().all(|xi| xi.is_finite_value())
}
