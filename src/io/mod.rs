//! Input/output helpers.
//!
//! - CSV ingest of observation batches and model fields (`ingest`)
//! - per-sample comparison export (`export`)
//! - JSON run report (`report`)

pub mod export;
pub mod ingest;
pub mod report;

pub use export::*;
pub use ingest::*;
pub use report::*;
