//! stopcrit: stop criteria for iterative linear solvers
//!
//! An iterative solver asks a stop criterium, once per iteration, whether to
//! keep going. This crate provides the criteria (relative residual with a
//! hysteresis window, iteration budget, residual growth, numeric failure), a
//! composite that combines them, an options struct that assembles the standard
//! set, and two reference Krylov drivers (CG, BiCGStab) built on top.

pub mod config;
pub mod core;
pub mod criterium;
pub mod error;
pub mod solver;

// Re-exports for convenience
pub use crate::config::*;
pub use crate::core::*;
pub use crate::criterium::*;
pub use crate::error::*;
pub use crate::solver::*;
