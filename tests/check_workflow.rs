//! End-to-end use of the library: CSV in memory -> window -> validate.

use cansheet_check::app::pipeline::validate_batch;
use cansheet_check::check::{find_first_violation, Outcome, Tolerance};
use cansheet_check::domain::{CheckMode, Component, FieldSeries, PositionSeries, Variant};
use cansheet_check::error::{CheckError, ModelError};
use cansheet_check::io::read_batch;
use cansheet_check::models::{Execution, PrecomputedReferences};
use cansheet_check::report::diagnose;

/// Ten samples crossing the 2016/2017 boundary. Hybrid Bphi drifts away from
/// the other references from row 7 on.
fn data_csv() -> String {
    let mut s = String::from(
        "year,ddate,r,colat,elong,\
br_analytic,btheta_analytic,bphi_analytic,\
br_integral,btheta_integral,bphi_integral,\
br_hybrid,btheta_hybrid,bphi_hybrid\n",
    );
    for i in 0..10 {
        let (year, ddate) = if i < 5 { (2016, 366.5 + 0.1 * i as f64) } else { (2017, 1.0 + 0.1 * i as f64) };
        let r = 10.0 + i as f64;
        let bphi = 2.0 * r;
        let hybrid_bphi = if i >= 7 { bphi + 0.5 } else { bphi };
        s.push_str(&format!(
            "{year},{ddate},{r},1.2,0.4,{r},{r},{bphi},{r},{r},{bphi},{r},{r},{hybrid_bphi}\n"
        ));
    }
    s
}

#[allow(clippy::type_complexity)]
fn model(r: &[f64], _theta: &[f64], _phi: &[f64]) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), ModelError> {
    if r.iter().any(|&x| x <= 0.0) {
        return Err("r must be positive".into());
    }
    Ok((r.to_vec(), r.to_vec(), r.iter().map(|x| 2.0 * x).collect()))
}

#[test]
fn validates_windowed_batch_against_all_variants() {
    let ingest = read_batch(data_csv().as_bytes()).unwrap();
    assert_eq!(ingest.rows_used(), 10);

    // Rows 2..10: the year boundary falls inside the window.
    let batch = ingest.batch.window(2, 8).unwrap();
    let refs = PrecomputedReferences::from_batch(&batch);

    for execution in [Execution::Sequential, Execution::Parallel] {
        let v = validate_batch(&batch, &model, &refs, Tolerance::default(), CheckMode::Bphi, execution).unwrap();

        assert_eq!(v.time.len(), 8);
        assert_eq!(v.outputs.len(), 8);
        for pair in v.time.continuous.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert_eq!(v.time.dates[0].yyyymmdd(), 20161231);
        assert_eq!(v.time.dates[7].yyyymmdd(), 20170101);

        assert_eq!(v.outcome(Variant::Analytic), Outcome::NoViolationFound);
        assert_eq!(v.outcome(Variant::Integral), Outcome::NoViolationFound);

        let hybrid = v.check(Variant::Hybrid).unwrap();
        let d = diagnose(hybrid, &v.time, &v.outputs, 2, &ingest.source_rows).unwrap();
        assert_eq!(d.index, 5);
        assert_eq!(d.batch_index, 7);
        assert_eq!(d.file_row, 7);
        assert_eq!(d.component, Component::Bphi);
        assert!((d.discrepancy - 0.5).abs() < 1e-9);
        assert_eq!(d.position.r, 17.0);
        assert_eq!(d.fields.model.bphi, 34.0);
        assert_eq!(d.fields.hybrid.bphi, 34.5);
        assert_eq!(d.fields.analytic.bphi, 34.0);
    }
}

#[test]
fn diagnosis_points_at_file_row_after_skipped_rows() {
    // Data row 0 has no `r` and is skipped; hybrid Bphi drifts at data row 3.
    let csv = "year,ddate,r,colat,elong,\
br_analytic,btheta_analytic,bphi_analytic,\
br_integral,btheta_integral,bphi_integral,\
br_hybrid,btheta_hybrid,bphi_hybrid
2016,100.0,,1.2,0.4,0,0,0,0,0,0,0,0,0
2016,100.1,5,1.2,0.4,5,5,10,5,5,10,5,5,10
2016,100.2,6,1.2,0.4,6,6,12,6,6,12,6,6,12
2016,100.3,7,1.2,0.4,7,7,14,7,7,14,7,7,15
";
    let ingest = read_batch(csv.as_bytes()).unwrap();
    assert_eq!(ingest.row_errors.len(), 1);
    assert_eq!(ingest.source_rows, vec![1, 2, 3]);

    let batch = ingest.batch.window(1, 2).unwrap();
    let refs = PrecomputedReferences::from_batch(&batch);
    let v = validate_batch(&batch, &model, &refs, Tolerance::default(), CheckMode::Bphi, Execution::Sequential)
        .unwrap();

    let d = diagnose(v.check(Variant::Hybrid).unwrap(), &v.time, &v.outputs, 1, &ingest.source_rows).unwrap();
    assert_eq!(d.index, 1);
    assert_eq!(d.batch_index, 2);
    assert_eq!(d.file_row, 3);
    assert_eq!(d.position.r, 7.0);
}

#[test]
fn model_failure_is_not_swallowed() {
    let ingest = read_batch(data_csv().as_bytes()).unwrap();
    let positions = PositionSeries::new(vec![-1.0; 10], vec![1.0; 10], vec![0.0; 10]).unwrap();
    let refs = PrecomputedReferences::from_batch(&ingest.batch);
    let err = cansheet_check::models::invoke_models(&positions, &model, &refs, Execution::Sequential).unwrap_err();
    assert!(matches!(err, CheckError::ModelInvocation { .. }));
}

#[test]
fn direct_scan_matches_documented_example() {
    let model = FieldSeries::new(vec![0.0; 3], vec![0.0; 3], vec![1.0, 1.0, 1.0]).unwrap();
    let reference = FieldSeries::new(vec![0.0; 3], vec![0.0; 3], vec![1.0, 1.05, 1.3]).unwrap();
    let positions = PositionSeries::new(vec![1.0, 2.0, 3.0], vec![0.5; 3], vec![0.0; 3]).unwrap();

    let out = find_first_violation(&model, &reference, &positions, Tolerance::default(), CheckMode::Bphi).unwrap();
    assert_eq!(out.violation().map(|v| v.index), Some(2));

    let short = FieldSeries::new(vec![0.0; 2], vec![0.0; 2], vec![1.0; 2]).unwrap();
    assert!(matches!(
        find_first_violation(&model, &short, &positions, Tolerance::default(), CheckMode::Bphi),
        Err(CheckError::LengthMismatch { .. })
    ));
}
