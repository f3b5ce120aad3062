//! Day-of-year conversion.
//!
//! Each `TimeSample` is `(year, day_fraction)` where the integer part of
//! `day_fraction` is the 1-based day of year and the fractional part is the
//! time of day. From it we derive:
//!
//! - the calendar date (`YYYYMMDD`, proleptic Gregorian)
//! - UT in hours, `[0, 24)`
//! - a continuous time axis: days since 1950-01-01 00:00 plus the fraction of day
//!
//! Conversion is per-sample and stateless, so the same sample always maps to the
//! same values regardless of what else is in the batch.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{CalendarDate, TimeSample};
use crate::error::CheckError;

/// Continuous time is zero at 00:00 on this date.
pub const CONTINUOUS_EPOCH: &str = "1950-01-01";

/// `NaiveDate::num_days_from_ce` of the epoch.
const EPOCH_DAYS_FROM_CE: i32 = 711_858;

/// One converted sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertedTime {
    pub date: CalendarDate,
    /// Hours since the start of `date`.
    pub ut: f64,
    /// Days since the epoch, including the fraction of day.
    pub continuous: f64,
}

/// Parallel date / UT / continuous-time arrays for a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeAxis {
    pub dates: Vec<CalendarDate>,
    pub ut: Vec<f64>,
    pub continuous: Vec<f64>,
}

impl TimeAxis {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ConvertedTime> {
        Some(ConvertedTime {
            date: *self.dates.get(index)?,
            ut: *self.ut.get(index)?,
            continuous: *self.continuous.get(index)?,
        })
    }
}

/// Convert `(year, day_of_year)` to a calendar date.
///
/// Returns `None` when `day` is 0 or past the end of the year.
pub fn day_to_date(year: i32, day: u32) -> Option<CalendarDate> {
    NaiveDate::from_yo_opt(year, day).and_then(CalendarDate::from_naive)
}

/// Inverse of [`day_to_date`].
pub fn date_to_day_number(date: CalendarDate) -> (i32, u32) {
    (date.year(), date.ordinal())
}

/// Convert a single sample.
pub fn convert_sample(sample: TimeSample) -> Result<ConvertedTime, CheckError> {
    let invalid = || CheckError::InvalidDate {
        year: sample.year,
        day_fraction: sample.day_fraction,
    };

    let fraction = sample.day_fraction;
    // Also rejects NaN. Anything past 367 cannot be a day of any year, and the
    // bound keeps the cast below in range.
    if !(1.0..367.0).contains(&fraction) {
        return Err(invalid());
    }

    let day = fraction.floor();
    let date = day_to_date(sample.year, day as u32).ok_or_else(invalid)?;

    let day_part = fraction - day;
    let ut = day_part * 24.0;
    let days = date.naive().num_days_from_ce() - EPOCH_DAYS_FROM_CE;
    let continuous = f64::from(days) + day_part;

    Ok(ConvertedTime { date, ut, continuous })
}

/// Convert a batch of samples into parallel date, UT and continuous-time arrays.
///
/// Fails on the first sample that does not name a valid day of its year.
pub fn convert_time(samples: &[TimeSample]) -> Result<TimeAxis, CheckError> {
    let mut axis = TimeAxis {
        dates: Vec::with_capacity(samples.len()),
        ut: Vec::with_capacity(samples.len()),
        continuous: Vec::with_capacity(samples.len()),
    };

    for &sample in samples {
        let t = convert_sample(sample)?;
        axis.dates.push(t.date);
        axis.ut.push(t.ut);
        axis.continuous.push(t.continuous);
    }

    log::debug!("converted {} time samples", axis.len());
    Ok(axis)
}
