//! Time-axis construction from `(year, fractional day-of-year)` samples.

pub mod convert;

pub use convert::*;
