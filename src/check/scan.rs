//! First-violation scan.

use serde::{Deserialize, Serialize};

use crate::check::criteria::{discrepancy, Tolerance};
use crate::check::summary::{summarize, ComponentSummary};
use crate::domain::{CheckMode, Component, FieldSeries, FieldVector, PositionSample, PositionSeries, Variant};
use crate::error::CheckError;
use crate::models::ModelOutputs;

/// The first sample where model and reference disagree by more than the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub index: usize,
    pub position: PositionSample,
    /// Component that produced the discrepancy.
    pub component: Component,
    pub discrepancy: f64,
    pub model: FieldVector,
    pub reference: FieldVector,
}

/// Result of a scan. Finding nothing is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Violation(Violation),
    NoViolationFound,
}

impl Outcome {
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Outcome::Violation(v) => Some(v),
            Outcome::NoViolationFound => None,
        }
    }

    pub fn is_violation(&self) -> bool {
        self.violation().is_some()
    }
}

/// Scan `0..n` in order and return the first index whose discrepancy exceeds `tolerance`.
///
/// All three inputs must have the same length; otherwise nothing is compared
/// and `LengthMismatch` is returned.
pub fn find_first_violation(
    model: &FieldSeries,
    reference: &FieldSeries,
    positions: &PositionSeries,
    tolerance: Tolerance,
    mode: CheckMode,
) -> Result<Outcome, CheckError> {
    let n = model.len();
    if reference.len() != n {
        return Err(CheckError::mismatch("reference field", n, reference.len()));
    }
    if positions.len() != n {
        return Err(CheckError::mismatch("positions", n, positions.len()));
    }

    for index in 0..n {
        let (component, d) = discrepancy(model, reference, mode, index);
        if !tolerance.is_exceeded_by(d) {
            continue;
        }
        // Lengths were checked above, so every lookup is in bounds.
        let (Some(position), Some(m), Some(r)) = (positions.get(index), model.get(index), reference.get(index))
        else {
            break;
        };
        return Ok(Outcome::Violation(Violation {
            index,
            position,
            component,
            discrepancy: d,
            model: m,
            reference: r,
        }));
    }

    Ok(Outcome::NoViolationFound)
}

/// Outcome and per-component summary of the model against one reference variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantCheck {
    pub variant: Variant,
    pub outcome: Outcome,
    pub summary: Vec<ComponentSummary>,
}

/// Check the model output against every reference variant.
pub fn check_variants(
    outputs: &ModelOutputs,
    positions: &PositionSeries,
    tolerance: Tolerance,
    mode: CheckMode,
) -> Result<Vec<VariantCheck>, CheckError> {
    Variant::ALL
        .iter()
        .map(|&variant| -> Result<VariantCheck, CheckError> {
            let reference = outputs.reference(variant);
            let outcome = find_first_violation(&outputs.model, reference, positions, tolerance, mode)?;
            let summary = summarize(&outputs.model, reference, tolerance)?;
            match outcome.violation() {
                Some(v) => log::debug!(
                    "{}: first violation at index {} ({} |d|={:.4})",
                    variant.display_name(),
                    v.index,
                    v.component.display_name(),
                    v.discrepancy
                ),
                None => log::debug!("{}: no violation", variant.display_name()),
            }
            Ok(VariantCheck {
                variant,
                outcome,
                summary,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bphi_series(values: &[f64]) -> FieldSeries {
        let zeros = vec![0.0; values.len()];
        FieldSeries::new(zeros.clone(), zeros, values.to_vec()).unwrap()
    }

    fn positions(n: usize) -> PositionSeries {
        let r: Vec<f64> = (0..n).map(|i| 20.0 + i as f64).collect();
        PositionSeries::new(r, vec![1.5; n], vec![3.0; n]).unwrap()
    }

    #[test]
    fn finds_first_index_above_tolerance() {
        let model = bphi_series(&[1.0, 1.0, 1.0]);
        let reference = bphi_series(&[1.0, 1.05, 1.3]);
        let out = find_first_violation(&model, &reference, &positions(3), Tolerance::default(), CheckMode::Bphi)
            .unwrap();

        let v = out.violation().unwrap();
        assert_eq!(v.index, 2);
        assert_eq!(v.component, Component::Bphi);
        assert!((v.discrepancy - 0.3).abs() < 1e-12);
        assert_eq!(v.position.r, 22.0);
        assert_eq!(v.model.bphi, 1.0);
        assert_eq!(v.reference.bphi, 1.3);
    }

    #[test]
    fn smallest_index_wins() {
        let model = bphi_series(&[0.0, 0.5, 0.0, 0.9]);
        let reference = bphi_series(&[0.0, 0.0, 0.0, 0.0]);
        let out = find_first_violation(&model, &reference, &positions(4), Tolerance::default(), CheckMode::Bphi)
            .unwrap();
        assert_eq!(out.violation().map(|v| v.index), Some(1));
    }

    #[test]
    fn identical_series_have_no_violation() {
        for n in [0, 1, 17] {
            let values: Vec<f64> = (0..n).map(|i| (i as f64).sin() * 100.0).collect();
            let model = bphi_series(&values);
            let out = find_first_violation(&model, &model.clone(), &positions(n), Tolerance::default(), CheckMode::Max)
                .unwrap();
            assert_eq!(out, Outcome::NoViolationFound);
        }
    }

    #[test]
    fn other_components_are_ignored_in_single_mode() {
        let model = FieldSeries::new(vec![5.0], vec![5.0], vec![1.0]).unwrap();
        let reference = FieldSeries::new(vec![0.0], vec![0.0], vec![1.0]).unwrap();
        let pos = positions(1);
        let tol = Tolerance::default();

        assert!(!find_first_violation(&model, &reference, &pos, tol, CheckMode::Bphi).unwrap().is_violation());
        let out = find_first_violation(&model, &reference, &pos, tol, CheckMode::Max).unwrap();
        assert_eq!(out.violation().map(|v| v.component), Some(Component::Br));
    }

    #[test]
    fn nan_is_not_a_violation() {
        let model = bphi_series(&[1.0, f64::NAN]);
        let reference = bphi_series(&[1.0, 1.0]);
        let out = find_first_violation(&model, &reference, &positions(2), Tolerance::default(), CheckMode::Bphi)
            .unwrap();
        assert_eq!(out, Outcome::NoViolationFound);

        let model = bphi_series(&[f64::NAN, 1.0, 2.0]);
        let reference = bphi_series(&[1.0, 1.0, 1.0]);
        let out = find_first_violation(&model, &reference, &positions(3), Tolerance::default(), CheckMode::Bphi)
            .unwrap();
        assert_eq!(out.violation().map(|v| v.index), Some(2));
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let model = bphi_series(&[1.0; 5]);
        let reference = bphi_series(&[9.0; 4]);
        let err = find_first_violation(&model, &reference, &positions(5), Tolerance::default(), CheckMode::Bphi)
            .unwrap_err();
        assert!(matches!(
            err,
            CheckError::LengthMismatch { context: "reference field", expected: 5, found: 4 }
        ));

        let err = find_first_violation(&model, &model, &positions(2), Tolerance::default(), CheckMode::Bphi)
            .unwrap_err();
        assert!(matches!(err, CheckError::LengthMismatch { context: "positions", .. }));
    }

    #[test]
    fn scan_is_deterministic() {
        let model = bphi_series(&[0.0, 0.2, 0.4]);
        let reference = bphi_series(&[0.0, 0.0, 0.0]);
        let pos = positions(3);
        let a = find_first_violation(&model, &reference, &pos, Tolerance::default(), CheckMode::Bphi).unwrap();
        let b = find_first_violation(&model, &reference, &pos, Tolerance::default(), CheckMode::Bphi).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(Outcome::NoViolationFound).unwrap();
        assert_eq!(json["outcome"], "no_violation_found");
    }

    #[test]
    fn checks_every_variant() {
        let model = bphi_series(&[1.0, 1.0]);
        let outputs = ModelOutputs {
            model: model.clone(),
            analytic: bphi_series(&[1.0, 1.5]),
            integral: model.clone(),
            hybrid: bphi_series(&[2.0, 1.0]),
        };
        let checks = check_variants(&outputs, &positions(2), Tolerance::default(), CheckMode::Bphi).unwrap();
        let indices: Vec<Option<usize>> = checks.iter().map(|c| c.outcome.violation().map(|v| v.index)).collect();
        assert_eq!(indices, vec![Some(1), None, Some(0)]);
        assert_eq!(checks[2].variant, Variant::Hybrid);
        assert_eq!(checks[0].summary.len(), 3);
    }
}
