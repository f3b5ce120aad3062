//! `cansheet-check` library crate.
//!
//! Validates a magnetodisc current-sheet field model against three reference
//! variants (analytic, integral, hybrid) over a batch of spacecraft samples.
//!
//! The core is I/O free:
//!
//! - [`time`]: `(year, fractional day-of-year)` to date, UT and continuous time
//! - [`models`]: one vectorized call per model, outputs aligned with the input
//! - [`check`]: first out-of-tolerance sample and per-component summaries
//!
//! The binary (`csc`) is a thin wrapper around [`app`], which adds CSV/JSON
//! I/O and terminal reports.

pub mod app;
pub mod check;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod models;
pub mod report;
pub mod time;
