//! Shared "check pipeline" logic.
//!
//! The workflow is:
//! data CSV -> window -> time axis + model invocation -> per-variant checks
//!
//! `validate_batch` is the I/O-free core and works with any live model;
//! `run_check` adds file loading for the `csc` binary.

use crate::check::{check_variants, Outcome, Tolerance, VariantCheck};
use crate::domain::{Batch, CheckConfig, CheckMode, ModelSource, Variant};
use crate::error::{AppError, CheckError};
use crate::io::ingest::{load_batch, load_model_fields, IngestedBatch};
use crate::models::{invoke_models, Execution, FieldModel, ModelOutputs, PrecomputedField, PrecomputedReferences, ReferenceModel};
use crate::time::{convert_time, TimeAxis};

/// Computed outputs of validating one batch.
#[derive(Debug, Clone)]
pub struct Validation {
    pub time: TimeAxis,
    pub outputs: ModelOutputs,
    /// One entry per variant, in `Variant::ALL` order.
    pub checks: Vec<VariantCheck>,
}

impl Validation {
    pub fn check(&self, variant: Variant) -> Option<&VariantCheck> {
        self.checks.iter().find(|c| c.variant == variant)
    }

    pub fn outcome(&self, variant: Variant) -> Outcome {
        self.check(variant)
            .map(|c| c.outcome)
            .unwrap_or(Outcome::NoViolationFound)
    }
}

/// All outputs of a single `csc check` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedBatch,
    /// The windowed batch that was validated.
    pub batch: Batch,
    /// Index of `batch[0]` within `ingest.batch`.
    pub start: usize,
    pub validation: Validation,
}

impl RunOutput {
    pub fn verdict(&self, primary: Variant) -> Outcome {
        self.validation.outcome(primary)
    }
}

/// Convert times, invoke all models once, and check the model against every reference.
pub fn validate_batch<M, R>(
    batch: &Batch,
    model: &M,
    references: &R,
    tolerance: Tolerance,
    mode: CheckMode,
    execution: Execution,
) -> Result<Validation, CheckError>
where
    M: FieldModel + ?Sized,
    R: ReferenceModel + ?Sized,
{
    let time = convert_time(batch.times())?;
    let outputs = invoke_models(batch.positions(), model, references, execution)?;
    let checks = check_variants(&outputs, batch.positions(), tolerance, mode)?;
    Ok(Validation { time, outputs, checks })
}

/// Execute the full check for the binary: load, window, validate.
pub fn run_check(config: &CheckConfig) -> Result<RunOutput, AppError> {
    let tolerance = Tolerance::new(config.tolerance)?;

    let ingest = load_batch(&config.data_path)?;
    let (start, count) = resolve_window(config.start, config.count, ingest.batch.len())?;
    let batch = ingest.batch.window(start, count)?;
    log::info!("checking samples {start}..{} of {}", start + count, ingest.batch.len());

    let model = match &config.model_source {
        ModelSource::Fields(path) => {
            let fields = load_model_fields(path, ingest.rows_read, &ingest.source_rows)?;
            PrecomputedField::new("model", fields.window(start, count)?)
        }
        ModelSource::Variant(variant) => PrecomputedField::from_variant(&batch, *variant),
    };
    let references = PrecomputedReferences::from_batch(&batch);
    let execution = if config.parallel {
        Execution::Parallel
    } else {
        Execution::Sequential
    };

    let validation = validate_batch(&batch, &model, &references, tolerance, config.mode, execution)?;

    Ok(RunOutput {
        ingest,
        batch,
        start,
        validation,
    })
}

/// Resolve `--start/--count` against a batch of `len` samples.
fn resolve_window(start: usize, count: Option<usize>, len: usize) -> Result<(usize, usize), AppError> {
    if start >= len {
        return Err(AppError::new(
            2,
            format!("Window start {start} is past the end of the data ({len} samples)."),
        ));
    }
    let count = count.unwrap_or(len - start);
    if count == 0 {
        return Err(AppError::new(2, "Window count must be > 0."));
    }
    Ok((start, count))
}
