//! Models backed by fields that were computed elsewhere.
//!
//! The observation files ship reference fields for each variant, and the model
//! under test may be run out-of-process with its output saved to disk. These
//! adapters serve such stored arrays through the same batched interfaces as a
//! live model.

use crate::domain::{Batch, FieldSeries, PositionSeries, ReferenceFields, Variant};
use crate::error::{CheckError, ModelError};
use crate::models::invoke::{FieldModel, ReferenceModel};

/// A stored model-under-test output.
#[derive(Debug, Clone)]
pub struct PrecomputedField {
    name: String,
    fields: FieldSeries,
}

impl PrecomputedField {
    pub fn new(name: impl Into<String>, fields: FieldSeries) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Use one of the batch's stored reference variants as the model under test.
    pub fn from_variant(batch: &Batch, variant: Variant) -> Self {
        Self::new(variant.display_name(), batch.references().get(variant).clone())
    }
}

impl FieldModel for PrecomputedField {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, positions: &PositionSeries) -> Result<FieldSeries, ModelError> {
        serve(&self.fields, positions)
    }
}

/// Reference variants taken from the stored batch columns.
#[derive(Debug, Clone)]
pub struct PrecomputedReferences {
    fields: ReferenceFields,
}

impl PrecomputedReferences {
    pub fn new(fields: ReferenceFields) -> Self {
        Self { fields }
    }

    pub fn from_batch(batch: &Batch) -> Self {
        Self::new(batch.references().clone())
    }
}

impl ReferenceModel for PrecomputedReferences {
    fn evaluate(&self, variant: Variant, positions: &PositionSeries) -> Result<FieldSeries, ModelError> {
        serve(self.fields.get(variant), positions)
    }
}

fn serve(fields: &FieldSeries, positions: &PositionSeries) -> Result<FieldSeries, ModelError> {
    if fields.len() != positions.len() {
        return Err(Box::new(CheckError::mismatch(
            "precomputed field",
            positions.len(),
            fields.len(),
        )));
    }
    Ok(fields.clone())
}
