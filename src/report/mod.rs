//! Reporting: violation diagnosis, run reports, and formatted terminal output.

use serde::{Deserialize, Serialize};

use crate::app::pipeline::RunOutput;
use crate::check::{Outcome, VariantCheck};
use crate::domain::{CheckConfig, CheckMode, Component, PositionSample, Variant};
use crate::models::{ModelOutputs, SampleFields};
use crate::time::{ConvertedTime, TimeAxis};

pub mod format;

pub use format::*;

/// Everything known about the first violating sample against one variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub variant: Variant,
    /// Index within the checked window.
    pub index: usize,
    /// Index within the loaded batch (window offset applied, skipped rows excluded).
    pub batch_index: usize,
    /// 0-based data row in the source file (header not counted).
    pub file_row: usize,
    pub time: ConvertedTime,
    pub position: PositionSample,
    pub component: Component,
    pub discrepancy: f64,
    pub fields: SampleFields,
}

/// Build the diagnosis for a variant check, if it found a violation.
///
/// `source_rows` maps each loaded batch sample to its data row in the file;
/// `start` is the offset of the checked window within that batch.
pub fn diagnose(
    check: &VariantCheck,
    time: &TimeAxis,
    outputs: &ModelOutputs,
    start: usize,
    source_rows: &[usize],
) -> Option<Diagnosis> {
    let v = check.outcome.violation()?;
    let batch_index = start + v.index;
    Some(Diagnosis {
        variant: check.variant,
        index: v.index,
        batch_index,
        file_row: *source_rows.get(batch_index)?,
        time: time.get(v.index)?,
        position: v.position,
        component: v.component,
        discrepancy: v.discrepancy,
        fields: outputs.fields_at(v.index)?,
    })
}

/// JSON-serializable summary of a `csc check` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub tool: String,
    pub data: String,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub start: usize,
    pub samples: usize,
    pub tolerance: f64,
    pub mode: CheckMode,
    pub primary: Variant,
    pub verdict: Outcome,
    pub first_time: Option<ConvertedTime>,
    pub last_time: Option<ConvertedTime>,
    pub checks: Vec<VariantCheck>,
    pub diagnoses: Vec<Diagnosis>,
}

pub fn build_run_report(run: &RunOutput, config: &CheckConfig) -> RunReport {
    let v = &run.validation;
    RunReport {
        tool: "csc".to_string(),
        data: config.data_path.display().to_string(),
        rows_read: run.ingest.rows_read,
        rows_skipped: run.ingest.row_errors.len(),
        start: run.start,
        samples: run.batch.len(),
        tolerance: config.tolerance,
        mode: config.mode,
        primary: config.primary,
        verdict: run.verdict(config.primary),
        first_time: v.time.get(0),
        last_time: v.time.len().checked_sub(1).and_then(|i| v.time.get(i)),
        checks: v.checks.clone(),
        diagnoses: v
            .checks
            .iter()
            .filter_map(|c| diagnose(c, &v.time, &v.outputs, run.start, &run.ingest.source_rows))
            .collect(),
    }
}
