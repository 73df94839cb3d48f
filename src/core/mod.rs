//! Core scalar and linear-algebra traits plus the norm kernels the stop criteria rely on.

pub mod norms;
pub mod traits;
pub mod wrappers;

pub use norms::{ScaledNorm, all_finite, euclidean_norm};
pub use traits::{InnerProduct, MatVec, Modulus};
