//! Export the per-sample comparison to CSV.
//!
//! One row per batch sample: time axis, position, model field and the three
//! reference fields. This is the table an external plotting tool needs to draw
//! the model against the references over continuous time.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Batch, Component, Variant};
use crate::error::AppError;
use crate::models::ModelOutputs;
use crate::time::TimeAxis;

/// Write the comparison table to a CSV file.
pub fn write_comparison_csv(
    path: &Path,
    batch: &Batch,
    time: &TimeAxis,
    outputs: &ModelOutputs,
) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_comparison(&mut file, batch, time, outputs)
}

/// Write the comparison table to any writer.
pub fn write_comparison<W: Write>(
    out: &mut W,
    batch: &Batch,
    time: &TimeAxis,
    outputs: &ModelOutputs,
) -> Result<(), AppError> {
    let n = batch.len();
    if time.len() != n || outputs.len() != n {
        return Err(AppError::new(
            4,
            format!(
                "Export inputs are misaligned: batch={n}, time={}, model={}.",
                time.len(),
                outputs.len()
            ),
        ));
    }

    let mut header = String::from("index,date,ut,continuous,r,colat,elong,br_model,btheta_model,bphi_model");
    for variant in Variant::ALL {
        for component in Component::ALL {
            header.push_str(&format!(",{}_{}", column_name(component), variant.display_name()));
        }
    }
    writeln!(out, "{header}").map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for i in 0..n {
        let (Some(t), Some(p), Some(f)) = (time.get(i), batch.positions().get(i), outputs.fields_at(i)) else {
            break;
        };
        writeln!(
            out,
            "{i},{},{:.6},{:.8},{:.6},{:.8},{:.8},{},{},{},{},{},{},{},{},{},{},{},{}",
            t.date,
            t.ut,
            t.continuous,
            p.r,
            p.theta,
            p.phi,
            f.model.br,
            f.model.btheta,
            f.model.bphi,
            f.analytic.br,
            f.analytic.btheta,
            f.analytic.bphi,
            f.integral.br,
            f.integral.btheta,
            f.integral.bphi,
            f.hybrid.br,
            f.hybrid.btheta,
            f.hybrid.bphi,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

fn column_name(component: Component) -> &'static str {
    match component {
        Component::Br => "br",
        Component::Btheta => "btheta",
        Component::Bphi => "bphi",
    }
}
