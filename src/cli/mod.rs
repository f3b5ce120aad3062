//! Command-line parsing for the current-sheet model checker.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! conversion and validation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::check::Tolerance;
use crate::domain::{CheckMode, Variant};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "csc", version, about = "Check a magnetodisc current-sheet model against reference variants")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare the model under test with the analytic, integral and hybrid references.
    Check(CheckArgs),
    /// Convert year + fractional day-of-year to date, UT and continuous time.
    Time(TimeArgs),
}

/// Options for `csc check`.
#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    /// Observation CSV (time, position, stored reference fields).
    ///
    /// Defaults to `CSC_DATA` from the environment or `.env`.
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// CSV of model-under-test output (`br,btheta,bphi`), row-aligned with the data.
    ///
    /// Defaults to `CSC_MODEL_FIELDS` from the environment or `.env`.
    #[arg(long, value_name = "CSV", conflicts_with = "model_variant")]
    pub model_fields: Option<PathBuf>,

    /// Use a stored reference variant as the model under test.
    #[arg(long, value_enum)]
    pub model_variant: Option<Variant>,

    /// First sample of the window.
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Number of samples in the window (default: to the end).
    #[arg(long)]
    pub count: Option<usize>,

    /// Absolute tolerance on the checked component(s).
    #[arg(short = 't', long, default_value_t = Tolerance::DEFAULT)]
    pub tolerance: f64,

    /// Component(s) compared against the tolerance.
    #[arg(short = 'c', long, value_enum, default_value_t = CheckMode::Bphi)]
    pub component: CheckMode,

    /// Reference variant that decides the verdict.
    #[arg(short = 'r', long, value_enum, default_value_t = Variant::Hybrid)]
    pub reference: Variant,

    /// Evaluate the four models concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Write the per-sample comparison table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Write the run report to JSON.
    #[arg(long, value_name = "JSON")]
    pub report: Option<PathBuf>,

    /// Exit with status 5 when the primary reference has a violation.
    #[arg(long)]
    pub fail_on_violation: bool,
}

/// Options for `csc time`.
#[derive(Debug, Args, Clone)]
pub struct TimeArgs {
    /// Year of every sample.
    pub year: i32,

    /// Fractional day-of-year values (Jan 1 00:00 = 1.0).
    #[arg(required = true, allow_negative_numbers = true)]
    pub day_fractions: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_defaults() {
        let cli = Cli::parse_from(["csc", "check", "--data", "x.csv", "--model-variant", "analytic"]);
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.tolerance, 0.1);
        assert_eq!(args.component, CheckMode::Bphi);
        assert_eq!(args.reference, Variant::Hybrid);
        assert_eq!(args.model_variant, Some(Variant::Analytic));
        assert!(!args.parallel);
    }

    #[test]
    fn model_sources_conflict() {
        let res = Cli::try_parse_from([
            "csc",
            "check",
            "--model-fields",
            "m.csv",
            "--model-variant",
            "hybrid",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn time_accepts_negative_values() {
        let cli = Cli::parse_from(["csc", "time", "2016", "60.5", "-1"]);
        let Command::Time(args) = cli.command else {
            panic!("expected time");
        };
        assert_eq!(args.day_fractions, vec![60.5, -1.0]);
    }
}
