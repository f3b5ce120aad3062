//! CSV ingest for observation batches and stored model output.
//!
//! The observation file holds one spacecraft sample per row: time, position and
//! the three stored reference fields. Rows with a missing or non-finite value
//! are skipped as a whole and reported, so every array of the resulting `Batch`
//! stays index-aligned.
//!
//! A model-fields file (`br,btheta,bphi`) must be row-aligned with the
//! observation file; it is reduced to the same kept rows.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Batch, FieldSeries, FieldVector, PositionSample, PositionSeries, ReferenceFields, TimeSample, Variant};
use crate::error::AppError;

const YEAR: &[&str] = &["year", "time_year"];
const DDATE: &[&str] = &["ddate", "time_ddate", "dayno"];
const R: &[&str] = &["r"];
const COLAT: &[&str] = &["colat", "theta", "sys3_colat_rads"];
const ELONG: &[&str] = &["elong", "phi", "sys3_elong_rads"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the aligned batch plus bookkeeping about skipped rows.
#[derive(Debug, Clone)]
pub struct IngestedBatch {
    pub batch: Batch,
    /// 0-based data-row index (in the file) of each batch sample.
    pub source_rows: Vec<usize>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedBatch {
    pub fn rows_used(&self) -> usize {
        self.batch.len()
    }
}

struct Row {
    time: TimeSample,
    position: PositionSample,
    analytic: FieldVector,
    integral: FieldVector,
    hybrid: FieldVector,
}

/// Load an observation batch from a CSV file.
pub fn load_batch(path: &Path) -> Result<IngestedBatch, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open data CSV '{}': {e}", path.display())))?;
    read_batch(file)
}

/// Read an observation batch from any CSV source.
pub fn read_batch<R: Read>(source: R) -> Result<IngestedBatch, AppError> {
    let mut reader = csv_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let columns = BatchColumns::resolve(&header_map)?;

    let mut rows = Vec::new();
    let mut source_rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| columns.parse(&record));
        match parsed {
            Ok(row) => {
                rows.push(row);
                source_rows.push(idx);
            }
            Err(message) => {
                log::warn!("skipping line {line}: {message}");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(3, "No valid rows in data CSV."));
    }

    let positions: Vec<PositionSample> = rows.iter().map(|r| r.position).collect();
    let series = |pick: fn(&Row) -> FieldVector| {
        let vectors: Vec<FieldVector> = rows.iter().map(pick).collect();
        FieldSeries::from_vectors(&vectors)
    };
    let references = ReferenceFields {
        analytic: series(|r| r.analytic),
        integral: series(|r| r.integral),
        hybrid: series(|r| r.hybrid),
    };
    let times = rows.iter().map(|r| r.time).collect();
    let batch = Batch::new(times, PositionSeries::from_samples(&positions), references)?;

    log::info!(
        "loaded {} samples ({} rows read, {} skipped)",
        batch.len(),
        rows_read,
        row_errors.len()
    );

    Ok(IngestedBatch {
        batch,
        source_rows,
        row_errors,
        rows_read,
    })
}

/// Load model-under-test fields from a CSV file and keep the rows in `source_rows`.
pub fn load_model_fields(path: &Path, rows_read: usize, source_rows: &[usize]) -> Result<FieldSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model-fields CSV '{}': {e}", path.display())))?;
    read_model_fields(file, rows_read, source_rows)
}

/// Read model-under-test fields (`br,btheta,bphi`).
///
/// The file must have exactly `rows_read` data rows, one per observation row,
/// and every row must parse: a bad row cannot be dropped without breaking
/// alignment with the observations.
pub fn read_model_fields<R: Read>(source: R, rows_read: usize, source_rows: &[usize]) -> Result<FieldSeries, AppError> {
    let mut reader = csv_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read model-fields CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let cols = FieldColumns::resolve(&header_map, "")?;

    let mut all = Vec::with_capacity(rows_read);
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let vector = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| cols.parse(&record))
            .map_err(|message| AppError::new(2, format!("Model-fields CSV line {line}: {message}")))?;
        all.push(vector);
    }

    if all.len() != rows_read {
        return Err(AppError::new(
            2,
            format!(
                "Model-fields CSV has {} rows but the data CSV has {rows_read}; files must be row-aligned.",
                all.len()
            ),
        ));
    }

    let kept: Vec<FieldVector> = source_rows.iter().filter_map(|&i| all.get(i).copied()).collect();
    if kept.len() != source_rows.len() {
        return Err(AppError::new(2, "Model-fields rows do not cover the kept data rows."));
    }
    Ok(FieldSeries::from_vectors(&kept))
}

fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source)
}

struct BatchColumns {
    year: usize,
    ddate: usize,
    r: usize,
    colat: usize,
    elong: usize,
    analytic: FieldColumns,
    integral: FieldColumns,
    hybrid: FieldColumns,
}

impl BatchColumns {
    fn resolve(header_map: &HashMap<String, usize>) -> Result<Self, AppError> {
        let variant = |v: Variant| FieldColumns::resolve(header_map, v.display_name());
        Ok(Self {
            year: require_column(header_map, YEAR)?,
            ddate: require_column(header_map, DDATE)?,
            r: require_column(header_map, R)?,
            colat: require_column(header_map, COLAT)?,
            elong: require_column(header_map, ELONG)?,
            analytic: variant(Variant::Analytic)?,
            integral: variant(Variant::Integral)?,
            hybrid: variant(Variant::Hybrid)?,
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<Row, String> {
        Ok(Row {
            time: TimeSample {
                year: parse_year(get_value(record, self.year, YEAR[0])?)?,
                day_fraction: parse_f64(record, self.ddate, DDATE[0])?,
            },
            position: PositionSample {
                r: parse_f64(record, self.r, R[0])?,
                theta: parse_f64(record, self.colat, COLAT[0])?,
                phi: parse_f64(record, self.elong, ELONG[0])?,
            },
            analytic: self.analytic.parse(record)?,
            integral: self.integral.parse(record)?,
            hybrid: self.hybrid.parse(record)?,
        })
    }
}

/// Column indices of one `br/btheta/bphi` triple, optionally suffixed (`br_hybrid`).
struct FieldColumns {
    names: [String; 3],
    idx: [usize; 3],
}

impl FieldColumns {
    fn resolve(header_map: &HashMap<String, usize>, suffix: &str) -> Result<Self, AppError> {
        let names = ["br", "btheta", "bphi"].map(|base| {
            if suffix.is_empty() {
                base.to_string()
            } else {
                format!("{base}_{suffix}")
            }
        });
        let mut idx = [0usize; 3];
        for (slot, name) in idx.iter_mut().zip(names.iter()) {
            *slot = *header_map
                .get(name)
                .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))?;
        }
        Ok(Self { names, idx })
    }

    fn parse(&self, record: &StringRecord) -> Result<FieldVector, String> {
        Ok(FieldVector {
            br: parse_f64(record, self.idx[0], &self.names[0])?,
            btheta: parse_f64(record, self.idx[1], &self.names[1])?,
            bphi: parse_f64(record, self.idx[2], &self.names[2])?,
        })
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Result<usize, AppError> {
    names
        .iter()
        .find_map(|n| header_map.get(*n).copied())
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{}`", names.join("` or `"))))
}

fn get_value<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let s = get_value(record, idx, name)?;
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{name}` value '{s}'.")),
    }
}

/// Years may be exported as floats (`2016.0`).
fn parse_year(s: &str) -> Result<i32, String> {
    if let Ok(y) = s.parse::<i32>() {
        return Ok(y);
    }
    match s.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) => Ok(v as i32),
        _ => Err(format!("Invalid `year` value '{s}'.")),
    }
}
