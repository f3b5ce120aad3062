//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - resolves the run configuration
//! - runs the check pipeline
//! - prints reports and writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::app::pipeline::RunOutput;
use crate::cli::{CheckArgs, Command, TimeArgs};
use crate::domain::{CheckConfig, ModelSource, TimeSample};
use crate::error::AppError;

pub mod pipeline;

/// Environment variable holding the default data CSV path.
pub const ENV_DATA: &str = "CSC_DATA";
/// Environment variable holding the default model-fields CSV path.
pub const ENV_MODEL_FIELDS: &str = "CSC_MODEL_FIELDS";

/// Entry point for the `csc` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Check(args) => handle_check(args),
        Command::Time(args) => handle_time(args),
    }
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let config = check_config_from_args(&args, |key| std::env::var(key).ok())?;
    let run = pipeline::run_check(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    // Optional exports.
    if let Some(path) = &config.export {
        crate::io::export::write_comparison_csv(path, &run.batch, &run.validation.time, &run.validation.outputs)?;
        log::info!("wrote comparison table to {}", path.display());
    }
    if let Some(path) = &config.report {
        let report = crate::report::build_run_report(&run, &config);
        crate::io::report::write_report_json(path, &report)?;
        log::info!("wrote run report to {}", path.display());
    }

    enforce_verdict(&config, &run)
}

/// With `--fail-on-violation`, a violation against the primary reference exits with code 5.
pub fn enforce_verdict(config: &CheckConfig, run: &RunOutput) -> Result<(), AppError> {
    if config.fail_on_violation && run.verdict(config.primary).is_violation() {
        return Err(AppError::new(
            5,
            format!("Tolerance exceeded against the {} reference.", config.primary.display_name()),
        ));
    }
    Ok(())
}

fn handle_time(args: TimeArgs) -> Result<(), AppError> {
    for &day_fraction in &args.day_fractions {
        let t = crate::time::convert_sample(TimeSample::new(args.year, day_fraction))?;
        println!("{}", crate::report::format_time_row(args.year, day_fraction, &t));
    }
    Ok(())
}

/// Resolve CLI flags plus environment defaults into a `CheckConfig`.
///
/// `env` looks up a variable; it is a parameter so resolution is testable
/// without touching the process environment.
pub fn check_config_from_args(
    args: &CheckArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<CheckConfig, AppError> {
    let data_path = args
        .data
        .clone()
        .or_else(|| env(ENV_DATA).map(PathBuf::from))
        .ok_or_else(|| AppError::new(2, format!("No data file: pass --data or set {ENV_DATA} (.env).")))?;

    let model_source = match (&args.model_fields, args.model_variant) {
        (Some(path), _) => ModelSource::Fields(path.clone()),
        (None, Some(variant)) => ModelSource::Variant(variant),
        (None, None) => env(ENV_MODEL_FIELDS)
            .map(|p| ModelSource::Fields(PathBuf::from(p)))
            .ok_or_else(|| {
                AppError::new(
                    2,
                    format!("No model under test: pass --model-fields, --model-variant, or set {ENV_MODEL_FIELDS}."),
                )
            })?,
    };

    Ok(CheckConfig {
        data_path,
        model_source,
        start: args.start,
        count: args.count,
        tolerance: args.tolerance,
        mode: args.component,
        primary: args.reference,
        parallel: args.parallel,
        export: args.export.clone(),
        report: args.report.clone(),
        fail_on_violation: args.fail_on_violation,
    })
}
