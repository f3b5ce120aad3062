//! Per-component discrepancy summary over a whole batch.

use serde::{Deserialize, Serialize};

use crate::check::criteria::{component_discrepancy, Tolerance};
use crate::domain::{Component, FieldSeries};
use crate::error::CheckError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub component: Component,
    /// Largest finite `|model - reference|` (0 for an empty batch).
    pub max_abs: f64,
    /// Index of `max_abs`, `None` if no finite discrepancy exists.
    pub max_index: Option<usize>,
    /// Samples strictly above the tolerance. NaN discrepancies are not counted here.
    pub exceed_count: usize,
    /// NaN or infinite discrepancies.
    pub non_finite: usize,
}

/// Summarize every component of `model` against `reference`.
pub fn summarize(
    model: &FieldSeries,
    reference: &FieldSeries,
    tolerance: Tolerance,
) -> Result<Vec<ComponentSummary>, CheckError> {
    if reference.len() != model.len() {
        return Err(CheckError::mismatch("reference field", model.len(), reference.len()));
    }

    let summaries = Component::ALL
        .iter()
        .map(|&component| {
            let mut s = ComponentSummary {
                component,
                max_abs: 0.0,
                max_index: None,
                exceed_count: 0,
                non_finite: 0,
            };
            for index in 0..model.len() {
                let d = component_discrepancy(model, reference, component, index);
                if tolerance.is_exceeded_by(d) {
                    s.exceed_count += 1;
                }
                if !d.is_finite() {
                    s.non_finite += 1;
                } else if s.max_index.is_none() || d > s.max_abs {
                    s.max_abs = d;
                    s.max_index = Some(index);
                }
            }
            s
        })
        .collect();

    Ok(summaries)
}
