//! Batched evaluation of the model under test and the three reference variants.
//!
//! Every model is called exactly once with the whole position batch. The four
//! calls share no state, so they may run concurrently (`Execution::Parallel`);
//! results and error precedence are the same either way.

use serde::{Deserialize, Serialize};

use crate::domain::{FieldSeries, FieldVector, PositionSeries, Variant};
use crate::error::{CheckError, ModelError};

/// The model under test: one vectorized call over a position batch.
pub trait FieldModel: Sync {
    /// Short label used in error messages.
    fn name(&self) -> &str {
        "model"
    }

    fn evaluate(&self, positions: &PositionSeries) -> Result<FieldSeries, ModelError>;
}

/// Any `Fn(r, theta, phi) -> (Br, Btheta, Bphi)` over whole arrays is a model.
impl<F> FieldModel for F
where
    F: Fn(&[f64], &[f64], &[f64]) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), ModelError> + Sync,
{
    fn evaluate(&self, positions: &PositionSeries) -> Result<FieldSeries, ModelError> {
        let (br, btheta, bphi) = self(positions.r(), positions.theta(), positions.phi())?;
        Ok(FieldSeries::new(br, btheta, bphi)?)
    }
}

/// Source of the reference variants, selected by `Variant`.
pub trait ReferenceModel: Sync {
    fn evaluate(&self, variant: Variant, positions: &PositionSeries) -> Result<FieldSeries, ModelError>;
}

/// Whether the four model calls run one after another or concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Execution {
    #[default]
    Sequential,
    Parallel,
}

/// Field vectors of all four models at one index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleFields {
    pub model: FieldVector,
    pub analytic: FieldVector,
    pub integral: FieldVector,
    pub hybrid: FieldVector,
}

/// Outputs of the four model calls, index-aligned with the input positions.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutputs {
    pub model: FieldSeries,
    pub analytic: FieldSeries,
    pub integral: FieldSeries,
    pub hybrid: FieldSeries,
}

impl ModelOutputs {
    pub fn len(&self) -> usize {
        self.model.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model.is_empty()
    }

    pub fn reference(&self, variant: Variant) -> &FieldSeries {
        match variant {
            Variant::Analytic => &self.analytic,
            Variant::Integral => &self.integral,
            Variant::Hybrid => &self.hybrid,
        }
    }

    pub fn fields_at(&self, index: usize) -> Option<SampleFields> {
        Some(SampleFields {
            model: self.model.get(index)?,
            analytic: self.analytic.get(index)?,
            integral: self.integral.get(index)?,
            hybrid: self.hybrid.get(index)?,
        })
    }
}

/// Evaluate the model under test and every reference variant on `positions`.
///
/// Model errors are returned as `CheckError::ModelInvocation` with the model's
/// error as source. An output whose length differs from the input is a
/// `LengthMismatch`. When several calls fail, the first in the order
/// model, analytic, integral, hybrid is reported.
pub fn invoke_models<M, R>(
    positions: &PositionSeries,
    model: &M,
    references: &R,
    execution: Execution,
) -> Result<ModelOutputs, CheckError>
where
    M: FieldModel + ?Sized,
    R: ReferenceModel + ?Sized,
{
    log::debug!("invoking 4 models on {} positions ({execution:?})", positions.len());

    let call_model = || model.evaluate(positions);
    let call_ref = |variant: Variant| references.evaluate(variant, positions);

    let (m, a, i, h) = match execution {
        Execution::Sequential => (
            call_model(),
            call_ref(Variant::Analytic),
            call_ref(Variant::Integral),
            call_ref(Variant::Hybrid),
        ),
        Execution::Parallel => {
            let ((m, a), (i, h)) = rayon::join(
                || rayon::join(call_model, || call_ref(Variant::Analytic)),
                || rayon::join(|| call_ref(Variant::Integral), || call_ref(Variant::Hybrid)),
            );
            (m, a, i, h)
        }
    };

    let n = positions.len();
    Ok(ModelOutputs {
        model: checked(m, model.name(), "model output", n)?,
        analytic: checked(a, Variant::Analytic.display_name(), "analytic output", n)?,
        integral: checked(i, Variant::Integral.display_name(), "integral output", n)?,
        hybrid: checked(h, Variant::Hybrid.display_name(), "hybrid output", n)?,
    })
}

fn checked(
    result: Result<FieldSeries, ModelError>,
    name: &str,
    context: &'static str,
    expected: usize,
) -> Result<FieldSeries, CheckError> {
    let series = result.map_err(|source| CheckError::ModelInvocation {
        model: name.to_string(),
        source,
    })?;
    if series.len() != expected {
        return Err(CheckError::mismatch(context, expected, series.len()));
    }
    Ok(series)
}
