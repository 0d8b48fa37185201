//! Calendar arithmetic used by the extractors.
//!
//! The engine decides *which* fields get *which* values; the date math itself
//! (adding units, month lengths, leap years, weekday distances) is delegated
//! to `chrono` through the functions here.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;

use crate::duration::{TimeUnit, TimeUnits};

/// Days assumed per month when a fractional month carries into days.
const DAYS_PER_MONTH: f64 = 30.0;

/// Which day begins a week, and so which weekday gets index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = day 0 of the week).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = day 0 of the week).
    Sunday,
}

/// How many days `weekday` is from the week-start day.
pub fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> i64 {
    match week_start {
        WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
        WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
    }
}

/// Shift a date by whole days.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Apply a unit → magnitude mapping to a local datetime.
///
/// Years and months move the calendar (clamping to the end of shorter
/// months); a fractional month carries into days. Weeks and smaller units
/// are exact durations.
pub fn add_time_units(base: NaiveDateTime, units: &TimeUnits) -> Option<NaiveDateTime> {
    let mut months = 0.0;
    let mut millis = 0.0;
    for (unit, amount) in units.iter() {
        match unit {
            TimeUnit::Year => months += amount * 12.0,
            TimeUnit::Month => months += amount,
            fixed => millis += amount * fixed.fixed_millis()? as f64,
        }
    }

    let whole_months = months.trunc();
    millis += (months - whole_months) * DAYS_PER_MONTH * 86_400_000.0;
    let millis = millis.round();

    // Amounts past what the integer casts hold are no date at all.
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    if !whole_months.is_finite() || whole_months.abs() > i32::MAX as f64 {
        return None;
    }

    let shifted = shift_months(base, whole_months as i32)?;
    shifted.checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}

fn shift_months(dt: NaiveDateTime, months: i32) -> Option<NaiveDateTime> {
    if months >= 0 {
        dt.checked_add_months(Months::new(months as u32))
    } else {
        dt.checked_sub_months(Months::new(months.unsigned_abs()))
    }
}

/// Window a bare year numeral into the most likely full year.
///
/// Numerals below 100 land in 19xx when above 50, otherwise in 20xx.
/// Anything else is taken literally.
pub fn most_likely_year(year: i32) -> i32 {
    if (0..100).contains(&year) {
        if year > 50 {
            year + 1900
        } else {
            year + 2000
        }
    } else {
        year
    }
}

/// The year that puts `month`/`day` closest to the reference date.
///
/// "10 januari" read in August 2012 is January 2013, not January 2012.
pub fn closest_year(reference: NaiveDate, month: u32, day: u32) -> i32 {
    let year = reference.year();
    let distance = |y: i32| {
        NaiveDate::from_ymd_opt(y, month, day).map(|d| (d - reference).num_days().abs())
    };

    let Some(current) = distance(year) else {
        return year;
    };
    if distance(year + 1).is_some_and(|next| next < current) {
        year + 1
    } else if distance(year - 1).is_some_and(|last| last < current) {
        year - 1
    } else {
        year
    }
}

/// Days forward from `date` to the next `weekday`, 0 if it is today.
pub fn days_forward_to(date: NaiveDate, weekday: Weekday) -> i64 {
    let diff = weekday.num_days_from_sunday() as i64 - date.weekday().num_days_from_sunday() as i64;
    diff.rem_euclid(7)
}

/// Days backward from `date` to the previous `weekday` (negative, never 0).
pub fn days_backward_to(date: NaiveDate, weekday: Weekday) -> i64 {
    let forward = days_forward_to(date, weekday);
    forward - 7
}
