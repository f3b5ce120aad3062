//! What counts as a disagreement between model and reference.

use serde::{Deserialize, Serialize};

use crate::domain::{CheckMode, Component, FieldSeries};
use crate::error::CheckError;

/// Absolute tolerance on a field component, in the units of the field.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tolerance(f64);

impl Tolerance {
    pub const DEFAULT: f64 = 0.1;

    pub fn new(value: f64) -> Result<Self, CheckError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(CheckError::InvalidTolerance(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// `true` if `discrepancy` is strictly above the tolerance. NaN never is.
    pub fn is_exceeded_by(self, discrepancy: f64) -> bool {
        discrepancy > self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// `|model - reference|` for one component at `index`.
///
/// Callers guarantee `index` is in bounds for both series.
pub(crate) fn component_discrepancy(
    model: &FieldSeries,
    reference: &FieldSeries,
    component: Component,
    index: usize,
) -> f64 {
    (model.component(component)[index] - reference.component(component)[index]).abs()
}

/// Discrepancy signal for `mode` at `index`, with the component it came from.
///
/// For `CheckMode::Max` the largest component wins. NaN components lose to any
/// number and are only returned when every component is NaN.
pub(crate) fn discrepancy(
    model: &FieldSeries,
    reference: &FieldSeries,
    mode: CheckMode,
    index: usize,
) -> (Component, f64) {
    let mut best: Option<(Component, f64)> = None;
    for &component in mode.components() {
        let d = component_discrepancy(model, reference, component, index);
        best = match best {
            Some((_, b)) if d.is_nan() || (!b.is_nan() && d <= b) => best,
            _ => Some((component, d)),
        };
    }
    // `components()` is never empty.
    best.unwrap_or((Component::Bphi, f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldVector;

    #[test]
    fn tolerance_validation() {
        assert_eq!(Tolerance::default().value(), 0.1);
        assert!(Tolerance::new(0.0).is_ok());
        assert!(matches!(Tolerance::new(-0.1), Err(CheckError::InvalidTolerance(_))));
        assert!(Tolerance::new(f64::NAN).is_err());
        assert!(Tolerance::new(f64::INFINITY).is_err());
    }

    #[test]
    fn boundary_is_not_exceeded() {
        let tol = Tolerance::new(0.1).unwrap();
        assert!(!tol.is_exceeded_by(0.1));
        assert!(tol.is_exceeded_by(0.100001));
        assert!(!tol.is_exceeded_by(f64::NAN));
        assert!(tol.is_exceeded_by(f64::INFINITY));
    }

    #[test]
    fn max_mode_picks_largest_component() {
        let m = FieldSeries::from_vectors(&[FieldVector { br: 1.0, btheta: 1.0, bphi: 1.0 }]);
        let r = FieldSeries::from_vectors(&[FieldVector { br: 1.2, btheta: 0.5, bphi: 1.1 }]);
        let (c, d) = discrepancy(&m, &r, CheckMode::Max, 0);
        assert_eq!(c, Component::Btheta);
        assert!((d - 0.5).abs() < 1e-12);

        let (c, d) = discrepancy(&m, &r, CheckMode::Br, 0);
        assert_eq!(c, Component::Br);
        assert!((d - 0.2).abs() < 1e-12);
    }

    #[test]
    fn max_mode_skips_nan_components() {
        let m = FieldSeries::from_vectors(&[FieldVector { br: f64::NAN, btheta: 1.0, bphi: 1.0 }]);
        let r = FieldSeries::from_vectors(&[FieldVector { br: 1.0, btheta: 9.0, bphi: 1.0 }]);
        let (c, d) = discrepancy(&m, &r, CheckMode::Max, 0);
        assert_eq!(c, Component::Btheta);
        assert!((d - 8.0).abs() < 1e-12);

        let all_nan = FieldSeries::from_vectors(&[FieldVector { br: f64::NAN, btheta: f64::NAN, bphi: f64::NAN }]);
        let (_, d) = discrepancy(&all_nan, &r, CheckMode::Max, 0);
        assert!(d.is_nan());
    }
}
