//! Core scalar and linear-algebra traits for stopcrit.

use num_complex::Complex;

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Inner products & norms.
pub trait InnerProduct<V> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd + From<f64>;
    /// Compute dot(x, y).
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖₂.
    fn norm(&self, x: &V) -> Self::Scalar;
}

/// Element magnitude, shared by real and complex vector entries.
///
/// Stop criteria only ever look at the magnitudes of an entry's parts and at
/// whether it is a usable number, so that is all this trait exposes.
/// Magnitudes are widened to `f64` regardless of the storage precision.
pub trait Modulus: Copy + Send + Sync + 'static {
    /// `(|re|, |im|)` as `f64`; real scalars report a zero imaginary part.
    fn abs_parts(self) -> (f64, f64);
    /// False when the entry (or either of its parts) is NaN or infinite.
    fn is_finite_value(self) -> bool;
}

impl Modulus for f64 {
    #[inline]
    fn abs_parts(self) -> (f64, f64) {
        (self.abs(), 0.0)
    }
    #[inline]
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

impl Modulus for f32 {
    #[inline]
    fn abs_parts(self) -> (f64, f64) {
        ((self as f64).abs(), 0.0)
    }
    #[inline]
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

impl Modulus for Complex<f64> {
    #[inline]
    fn abs_parts(self) -> (f64, f64) {
        (self.re.abs(), self.im.abs())
    }
    #[inline]
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

impl Modulus for Complex<f32> {
    #[inline]
    fn abs_parts(self) -> (f64, f64) {
        ((self.re as f64).abs(), (self.im as f64).abs())
    }
    #[inline]
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}
