//! Configuration surface for the stop criteria.

pub mod options;
pub use options::StopOptions;
