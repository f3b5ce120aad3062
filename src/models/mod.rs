//! Model invocation.
//!
//! The physical current-sheet models are external. This module only defines
//! how they are called (one vectorized call per model) and collects their
//! outputs into index-aligned series.

pub mod invoke;
pub mod precomputed;

pub use invoke::*;
pub use precomputed::*;
