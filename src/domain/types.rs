//! Shared domain types.
//!
//! A `Batch` is columnar: times, positions and the three stored reference fields
//! are kept as parallel arrays so that each model can be evaluated with a single
//! vectorized call. Every constructor checks that the arrays are index-aligned,
//! and every slicing operation slices all of them together.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::CheckError;

/// One observed time stamp: year plus fractional day-of-year (Jan 1 00:00 = 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSample {
    pub year: i32,
    pub day_fraction: f64,
}

impl TimeSample {
    pub fn new(year: i32, day_fraction: f64) -> Self {
        Self { year, day_fraction }
    }
}

/// A calendar date that encodes as the integer `YYYYMMDD`.
///
/// Only years `1..=9999` are representable so the encoding stays unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub const MIN_YEAR: i32 = 1;
    pub const MAX_YEAR: i32 = 9999;

    pub fn from_naive(date: NaiveDate) -> Option<Self> {
        (Self::MIN_YEAR..=Self::MAX_YEAR)
            .contains(&date.year())
            .then_some(Self(date))
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).and_then(Self::from_naive)
    }

    /// Decode a `YYYYMMDD` integer.
    pub fn from_yyyymmdd(value: u32) -> Option<Self> {
        let year = i32::try_from(value / 10_000).ok()?;
        Self::from_ymd(year, (value / 100) % 100, value % 100)
    }

    pub fn yyyymmdd(self) -> u32 {
        // Year is within 1..=9999, so the cast cannot wrap.
        self.0.year() as u32 * 10_000 + self.0.month() * 100 + self.0.day()
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// Day of year, 1-based.
    pub fn ordinal(self) -> u32 {
        self.0.ordinal()
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }
}

impl From<CalendarDate> for u32 {
    fn from(value: CalendarDate) -> Self {
        value.yyyymmdd()
    }
}

impl TryFrom<u32> for CalendarDate {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_yyyymmdd(value).ok_or_else(|| format!("invalid YYYYMMDD date: {value}"))
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08}", self.yyyymmdd())
    }
}

/// Spacecraft position in spherical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Radial distance.
    pub r: f64,
    /// Colatitude (radians).
    pub theta: f64,
    /// East longitude (radians).
    pub phi: f64,
}

/// Columnar positions, the input shape of a vectorized model call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionSeries {
    r: Vec<f64>,
    theta: Vec<f64>,
    phi: Vec<f64>,
}

impl PositionSeries {
    pub fn new(r: Vec<f64>, theta: Vec<f64>, phi: Vec<f64>) -> Result<Self, CheckError> {
        ensure_len("positions.theta", r.len(), theta.len())?;
        ensure_len("positions.phi", r.len(), phi.len())?;
        Ok(Self { r, theta, phi })
    }

    pub fn from_samples(samples: &[PositionSample]) -> Self {
        Self {
            r: samples.iter().map(|p| p.r).collect(),
            theta: samples.iter().map(|p| p.theta).collect(),
            phi: samples.iter().map(|p| p.phi).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn r(&self) -> &[f64] {
        &self.r
    }

    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    pub fn phi(&self) -> &[f64] {
        &self.phi
    }

    pub fn get(&self, index: usize) -> Option<PositionSample> {
        Some(PositionSample {
            r: *self.r.get(index)?,
            theta: *self.theta.get(index)?,
            phi: *self.phi.get(index)?,
        })
    }

    fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            r: self.r[start..end].to_vec(),
            theta: self.theta[start..end].to_vec(),
            phi: self.phi[start..end].to_vec(),
        }
    }
}

/// Field vector component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Br,
    Btheta,
    Bphi,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Br, Component::Btheta, Component::Bphi];

    pub fn display_name(self) -> &'static str {
        match self {
            Component::Br => "Br",
            Component::Btheta => "Btheta",
            Component::Bphi => "Bphi",
        }
    }
}

/// Magnetic field in spherical components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldVector {
    pub br: f64,
    pub btheta: f64,
    pub bphi: f64,
}

impl FieldVector {
    pub fn component(&self, component: Component) -> f64 {
        match component {
            Component::Br => self.br,
            Component::Btheta => self.btheta,
            Component::Bphi => self.bphi,
        }
    }
}

/// Columnar field vectors, the output shape of a vectorized model call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSeries {
    br: Vec<f64>,
    btheta: Vec<f64>,
    bphi: Vec<f64>,
}

impl FieldSeries {
    pub fn new(br: Vec<f64>, btheta: Vec<f64>, bphi: Vec<f64>) -> Result<Self, CheckError> {
        ensure_len("field.btheta", br.len(), btheta.len())?;
        ensure_len("field.bphi", br.len(), bphi.len())?;
        Ok(Self { br, btheta, bphi })
    }

    pub fn from_vectors(vectors: &[FieldVector]) -> Self {
        Self {
            br: vectors.iter().map(|v| v.br).collect(),
            btheta: vectors.iter().map(|v| v.btheta).collect(),
            bphi: vectors.iter().map(|v| v.bphi).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.br.len()
    }

    pub fn is_empty(&self) -> bool {
        self.br.is_empty()
    }

    pub fn component(&self, component: Component) -> &[f64] {
        match component {
            Component::Br => &self.br,
            Component::Btheta => &self.btheta,
            Component::Bphi => &self.bphi,
        }
    }

    pub fn get(&self, index: usize) -> Option<FieldVector> {
        Some(FieldVector {
            br: *self.br.get(index)?,
            btheta: *self.btheta.get(index)?,
            bphi: *self.bphi.get(index)?,
        })
    }

    /// Slice `[start, start + count)`, failing if it runs past the end.
    pub fn window(&self, start: usize, count: usize) -> Result<Self, CheckError> {
        let end = window_end(start, count, self.len())?;
        Ok(Self {
            br: self.br[start..end].to_vec(),
            btheta: self.btheta[start..end].to_vec(),
            bphi: self.bphi[start..end].to_vec(),
        })
    }
}

/// The three reference variants of the current-sheet model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Analytic,
    Integral,
    Hybrid,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Analytic, Variant::Integral, Variant::Hybrid];

    pub fn display_name(self) -> &'static str {
        match self {
            Variant::Analytic => "analytic",
            Variant::Integral => "integral",
            Variant::Hybrid => "hybrid",
        }
    }
}

/// Stored reference fields, one series per variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceFields {
    pub analytic: FieldSeries,
    pub integral: FieldSeries,
    pub hybrid: FieldSeries,
}

impl ReferenceFields {
    pub fn get(&self, variant: Variant) -> &FieldSeries {
        match variant {
            Variant::Analytic => &self.analytic,
            Variant::Integral => &self.integral,
            Variant::Hybrid => &self.hybrid,
        }
    }
}

/// Which component(s) produce the discrepancy signal.
///
/// `Max` takes the largest absolute difference over all three components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    Br,
    Btheta,
    #[default]
    Bphi,
    Max,
}

impl CheckMode {
    pub fn components(self) -> &'static [Component] {
        match self {
            CheckMode::Br => &[Component::Br],
            CheckMode::Btheta => &[Component::Btheta],
            CheckMode::Bphi => &[Component::Bphi],
            CheckMode::Max => &Component::ALL,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CheckMode::Br => "Br",
            CheckMode::Btheta => "Btheta",
            CheckMode::Bphi => "Bphi",
            CheckMode::Max => "max(Br, Btheta, Bphi)",
        }
    }
}

/// An aligned batch of observations: times, positions and stored reference fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    times: Vec<TimeSample>,
    positions: PositionSeries,
    references: ReferenceFields,
}

impl Batch {
    pub fn new(
        times: Vec<TimeSample>,
        positions: PositionSeries,
        references: ReferenceFields,
    ) -> Result<Self, CheckError> {
        let n = times.len();
        ensure_len("batch.positions", n, positions.len())?;
        for variant in Variant::ALL {
            ensure_len(reference_context(variant), n, references.get(variant).len())?;
        }
        Ok(Self {
            times,
            positions,
            references,
        })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[TimeSample] {
        &self.times
    }

    pub fn positions(&self) -> &PositionSeries {
        &self.positions
    }

    pub fn references(&self) -> &ReferenceFields {
        &self.references
    }

    /// Slice every aligned array to `[start, start + count)`.
    pub fn window(&self, start: usize, count: usize) -> Result<Self, CheckError> {
        let end = window_end(start, count, self.len())?;
        Ok(Self {
            times: self.times[start..end].to_vec(),
            positions: self.positions.slice(start, end),
            references: ReferenceFields {
                analytic: self.references.analytic.window(start, count)?,
                integral: self.references.integral.window(start, count)?,
                hybrid: self.references.hybrid.window(start, count)?,
            },
        })
    }
}

fn reference_context(variant: Variant) -> &'static str {
    match variant {
        Variant::Analytic => "batch.references.analytic",
        Variant::Integral => "batch.references.integral",
        Variant::Hybrid => "batch.references.hybrid",
    }
}

fn ensure_len(context: &'static str, expected: usize, found: usize) -> Result<(), CheckError> {
    if expected == found {
        Ok(())
    } else {
        Err(CheckError::mismatch(context, expected, found))
    }
}

fn window_end(start: usize, count: usize, len: usize) -> Result<usize, CheckError> {
    match start.checked_add(count) {
        Some(end) if end <= len => Ok(end),
        _ => Err(CheckError::mismatch("window", start.saturating_add(count), len)),
    }
}

/// Where the model-under-test output comes from when driven by the `csc` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// CSV of precomputed `br,btheta,bphi`, row-aligned with the data file.
    Fields(PathBuf),
    /// Use a stored reference variant as the model under test.
    Variant(Variant),
}

/// A full `csc check` run as understood by the pipeline.
///
/// Derived from CLI flags, `.env` and defaults.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    pub data_path: PathBuf,
    pub model_source: ModelSource,

    /// First sample of the window.
    pub start: usize,
    /// Window length (`None` = to the end of the file).
    pub count: Option<usize>,

    pub tolerance: f64,
    pub mode: CheckMode,
    /// Variant that decides the run's verdict.
    pub primary: Variant,
    pub parallel: bool,

    pub export: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub fail_on_violation: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> FieldSeries {
        FieldSeries::new(values.to_vec(), values.to_vec(), values.to_vec()).unwrap()
    }

    fn batch(n: usize) -> Batch {
        let times = (0..n).map(|i| TimeSample::new(2016, 1.0 + i as f64)).collect();
        let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let positions = PositionSeries::new(xs.clone(), xs.clone(), xs.clone()).unwrap();
        let references = ReferenceFields {
            analytic: series(&xs),
            integral: series(&xs),
            hybrid: series(&xs),
        };
        Batch::new(times, positions, references).unwrap()
    }

    #[test]
    fn calendar_date_encodes_yyyymmdd() {
        let d = CalendarDate::from_ymd(2016, 2, 29).unwrap();
        assert_eq!(d.yyyymmdd(), 20160229);
        assert_eq!(d.to_string(), "20160229");
        assert_eq!(CalendarDate::from_yyyymmdd(20160229), Some(d));
        assert_eq!(CalendarDate::from_yyyymmdd(20150229), None);
    }

    #[test]
    fn calendar_date_serializes_as_integer() {
        let d = CalendarDate::from_ymd(2017, 3, 27).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "20170327");
        let back: CalendarDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn misaligned_positions_are_rejected() {
        let err = PositionSeries::new(vec![1.0, 2.0], vec![0.1], vec![0.2, 0.3]).unwrap_err();
        assert!(matches!(err, CheckError::LengthMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn batch_rejects_short_reference() {
        let positions = PositionSeries::new(vec![1.0, 2.0], vec![0.1, 0.2], vec![0.0, 0.0]).unwrap();
        let references = ReferenceFields {
            analytic: series(&[1.0, 2.0]),
            integral: series(&[1.0]),
            hybrid: series(&[1.0, 2.0]),
        };
        let times = vec![TimeSample::new(2016, 1.0), TimeSample::new(2016, 1.5)];
        let err = Batch::new(times, positions, references).unwrap_err();
        assert!(matches!(
            err,
            CheckError::LengthMismatch { context: "batch.references.integral", .. }
        ));
    }

    #[test]
    fn window_slices_all_arrays_together() {
        let b = batch(10);
        let w = b.window(3, 4).unwrap();
        assert_eq!(w.len(), 4);
        assert_eq!(w.times()[0].day_fraction, 4.0);
        assert_eq!(w.positions().get(0).unwrap().r, 3.0);
        assert_eq!(w.references().hybrid.get(3).unwrap().bphi, 6.0);
        assert_eq!(w.positions().len(), w.references().analytic.len());
    }

    #[test]
    fn window_past_end_is_an_error() {
        let b = batch(5);
        assert!(b.window(3, 2).is_ok());
        assert!(matches!(
            b.window(3, 3),
            Err(CheckError::LengthMismatch { expected: 6, found: 5, .. })
        ));
        assert!(b.window(usize::MAX, 2).is_err());
    }

    #[test]
    fn check_mode_components() {
        assert_eq!(CheckMode::default(), CheckMode::Bphi);
        assert_eq!(CheckMode::Bphi.components(), &[Component::Bphi]);
        assert_eq!(CheckMode::Max.components().len(), 3);
    }
}
