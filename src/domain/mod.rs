//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - time and position inputs (`TimeSample`, `PositionSample`, `PositionSeries`)
//! - field outputs (`FieldVector`, `FieldSeries`, `ReferenceFields`)
//! - the aligned input batch (`Batch`)
//! - run configuration enums and structs (`Variant`, `Component`, `CheckMode`, `CheckConfig`)

pub mod types;

pub use types::*;
