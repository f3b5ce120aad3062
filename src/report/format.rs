//! Formatted terminal output.
//!
//! Formatting lives here so the check code stays free of presentation concerns.

use crate::app::pipeline::RunOutput;
use crate::check::{ComponentSummary, Outcome, VariantCheck};
use crate::domain::{CheckConfig, FieldVector, Variant};
use crate::report::{diagnose, Diagnosis};
use crate::time::ConvertedTime;

/// Format the full run summary: data, window, per-variant outcomes and the primary diagnosis.
pub fn format_run_summary(run: &RunOutput, config: &CheckConfig) -> String {
    let mut out = String::new();
    let v = &run.validation;

    out.push_str("=== csc - current-sheet model check ===\n");
    out.push_str(&format!("Data: {}\n", config.data_path.display()));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        run.ingest.rows_read,
        run.ingest.rows_used(),
        run.ingest.row_errors.len()
    ));
    out.push_str(&format!(
        "Window: start={} n={}\n",
        run.start,
        run.batch.len()
    ));
    if let (Some(first), Some(last)) = (v.time.get(0), v.time.len().checked_sub(1).and_then(|i| v.time.get(i))) {
        out.push_str(&format!("Time: {} .. {}\n", fmt_time(&first), fmt_time(&last)));
    }
    out.push_str(&format!(
        "Check: {} | tolerance={} | primary={}\n",
        config.mode.display_name(),
        config.tolerance,
        config.primary.display_name()
    ));

    out.push_str("\nPer-variant results:\n");
    for check in &v.checks {
        let chosen = if check.variant == config.primary { "*" } else { " " };
        out.push_str(&format!("{chosen} {:<9} {}\n", check.variant.display_name(), fmt_outcome(&check.outcome)));
    }

    out.push_str("\nDiscrepancy summary (|model - reference|):\n");
    out.push_str(&format_summary_table(&v.checks));

    let primary = v
        .check(config.primary)
        .and_then(|c| diagnose(c, &v.time, &v.outputs, run.start, &run.ingest.source_rows));
    if let Some(d) = primary {
        out.push('\n');
        out.push_str(&format_diagnosis(&d));
    }

    out
}

/// Format one diagnosis block.
pub fn format_diagnosis(d: &Diagnosis) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "First violation vs {}: index {} (batch index {}, data row {})\n",
        d.variant.display_name(),
        d.index,
        d.batch_index,
        d.file_row
    ));
    out.push_str(&format!("- time     : {}\n", fmt_time(&d.time)));
    out.push_str(&format!(
        "- position : r={:.4} colat={:.6} elong={:.6}\n",
        d.position.r, d.position.theta, d.position.phi
    ));
    out.push_str(&format!(
        "- {} |d|={:.4}\n",
        d.component.display_name(),
        d.discrepancy
    ));
    out.push_str(&format!("{:<10} {:>12} {:>12} {:>12}\n", "", "Br", "Btheta", "Bphi"));
    out.push_str(&fmt_field_row("model", &d.fields.model));
    for variant in Variant::ALL {
        let f = match variant {
            Variant::Analytic => &d.fields.analytic,
            Variant::Integral => &d.fields.integral,
            Variant::Hybrid => &d.fields.hybrid,
        };
        out.push_str(&fmt_field_row(variant.display_name(), f));
    }
    out
}

/// Format one `csc time` output line.
pub fn format_time_row(year: i32, day_fraction: f64, t: &ConvertedTime) -> String {
    format!("{year:>5} {day_fraction:>14.6} -> {}", fmt_time(t))
}

fn format_summary_table(checks: &[VariantCheck]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<9} {:<7} {:>12} {:>8} {:>8}\n",
        "variant", "comp", "max|d|", "at", "over"
    ));
    out.push_str(&format!("{:-<9} {:-<7} {:-<12} {:-<8} {:-<8}\n", "", "", "", "", ""));
    for check in checks {
        for s in &check.summary {
            out.push_str(&fmt_summary_row(check.variant, s));
        }
    }
    out
}

fn fmt_summary_row(variant: Variant, s: &ComponentSummary) -> String {
    let at = s.max_index.map(|i| i.to_string()).unwrap_or_else(|| "-".to_string());
    let mut row = format!(
        "{:<9} {:<7} {:>12.4} {:>8} {:>8}",
        variant.display_name(),
        s.component.display_name(),
        s.max_abs,
        at,
        s.exceed_count
    );
    if s.non_finite > 0 {
        row.push_str(&format!(" ({} non-finite)", s.non_finite));
    }
    row.push('\n');
    row
}

fn fmt_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::NoViolationFound => "no violation".to_string(),
        Outcome::Violation(v) => format!(
            "violation at index {} ({} |d|={:.4})",
            v.index,
            v.component.display_name(),
            v.discrepancy
        ),
    }
}

fn fmt_time(t: &ConvertedTime) -> String {
    format!("{} UT {:>9.5}h (t={:.6})", t.date, t.ut, t.continuous)
}

fn fmt_field_row(label: &str, f: &FieldVector) -> String {
    format!("{label:<10} {:>12.4} {:>12.4} {:>12.4}\n", f.br, f.btheta, f.bphi)
}
