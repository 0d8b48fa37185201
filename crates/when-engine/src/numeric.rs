//! Numeric dates: ISO 8601 ("2012-08-10", "2012-08-10T14:30:00Z") and
//! separator dates ("10/8/2012", "10.08.2012", "10/8").

use chrono::NaiveDate;
use regex::{Captures, Regex};

use crate::calendar::{closest_year, most_likely_year};
use crate::components::{Field, Meridiem, ParsingComponents, ParsingResult};
use crate::error::WhenError;
use crate::pattern::{compile, scan};
use crate::primary::fraction_to_millis;
use crate::reference::ReferenceInstant;

const ISO_PATTERN: &str = r"(?P<year>[0-9]{4})-(?P<month>[0-9]{1,2})-(?P<day>[0-9]{1,2})(?:T(?P<hour>[0-9]{1,2}):(?P<minute>[0-9]{1,2})(?::(?P<second>[0-9]{1,2})(?:\.(?P<millisecond>[0-9]{1,4}))?)?(?P<zone>Z|[+-][0-9]{2}(?::?[0-9]{2})?)?)?";

const SLASH_PATTERN: &str = r"(?P<first>[0-3]?[0-9])[/.\-](?P<second>[0-3]?[0-9])(?:[/.\-](?P<year>[0-9]{4}|[0-9]{2}))?";

/// "1.2" and "1.12.12" read as times or versions, not dates.
const TIME_LIKE_PATTERN: &str = r"^[0-9]\.[0-9](?:[0-9]?\.[0-9]{1,2})?$";

/// Extractor for ISO 8601 calendar dates with an optional time and zone.
#[derive(Debug, Clone)]
pub struct IsoDateTime {
    regex: Regex,
}

impl IsoDateTime {
    pub fn new() -> Result<Self, WhenError> {
        Ok(Self {
            regex: compile("iso date", ISO_PATTERN)?,
        })
    }

    pub fn try_match(
        &self,
        text: &str,
        offset: usize,
        _reference: &ReferenceInstant,
    ) -> Option<ParsingResult> {
        scan(&self.regex, text, offset, |caps| {
            let whole = caps.get(0)?;
            let components = iso_components(caps)?;
            Some(ParsingResult::new(whole.start(), whole.as_str(), components))
        })
    }
}

fn iso_components(caps: &Captures<'_>) -> Option<ParsingComponents> {
    let month = u32::try_from(number(caps, "month")?).ok()?;
    let day = u32::try_from(number(caps, "day")?).ok()?;
    let date = NaiveDate::from_ymd_opt(number(caps, "year")?, month, day)?;

    let mut components = ParsingComponents::new();
    components.assign_date(date);

    let Some(hour) = number(caps, "hour") else {
        return Some(components);
    };
    let minute = number(caps, "minute")?;
    if !(0..=24).contains(&hour) || !(0..=59).contains(&minute) {
        return None;
    }
    components
        .assign(Field::Hour, hour)
        .assign(Field::Minute, minute)
        .imply(Field::Meridiem, Meridiem::of_hour(hour as u32).value());

    if let Some(second) = number(caps, "second") {
        if second > 59 {
            return None;
        }
        components.assign(Field::Second, second);
    }
    if let Some(fraction) = caps.name("millisecond") {
        components.assign(Field::Millisecond, fraction_to_millis(fraction.as_str())?);
    }
    if let Some(zone) = caps.name("zone") {
        components.assign(Field::TimezoneOffset, zone_offset_minutes(zone.as_str())?);
    }
    Some(components)
}

/// "Z" → 0, "+02:00", "+0200" and "+02" → 120, "-05:30" → -330.
fn zone_offset_minutes(zone: &str) -> Option<i32> {
    if zone.eq_ignore_ascii_case("z") {
        return Some(0);
    }
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let digits: String = zone.chars().filter(char::is_ascii_digit).collect();
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = match digits.get(2..) {
        Some(rest) if !rest.is_empty() => rest.parse().ok()?,
        _ => 0,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

/// Extractor for day and month numbers joined by `/`, `.` or `-`, with an
/// optional year.
#[derive(Debug, Clone)]
pub struct SlashDate {
    regex: Regex,
    time_like: Regex,
    little_endian: bool,
}

impl SlashDate {
    /// `little_endian` reads "10/8" as the 10th of August; otherwise the
    /// month comes first.
    pub fn new(little_endian: bool) -> Result<Self, WhenError> {
        Ok(Self {
            regex: compile("slash date", SLASH_PATTERN)?,
            time_like: compile("slash date time-like", TIME_LIKE_PATTERN)?,
            little_endian,
        })
    }

    pub fn try_match(
        &self,
        text: &str,
        offset: usize,
        reference: &ReferenceInstant,
    ) -> Option<ParsingResult> {
        scan(&self.regex, text, offset, |caps| {
            let whole = caps.get(0)?;
            if !stands_alone(text, whole.start(), whole.end()) || self.time_like.is_match(whole.as_str()) {
                return None;
            }
            // Without a year only "/" is a date separator; "8.30" is a time.
            if caps.name("year").is_none() && !whole.as_str().contains('/') {
                return None;
            }

            let (first, second) = (number(caps, "first")?, number(caps, "second")?);
            let (day, month) = if self.little_endian {
                (first, second)
            } else {
                (second, first)
            };
            // "25/12" under month-first order still means December 25th.
            let (day, month) = if month > 12 && (1..=12).contains(&day) && month <= 31 {
                (month, day)
            } else {
                (day, month)
            };
            if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
                return None;
            }

            let mut components = ParsingComponents::new();
            components.assign(Field::Day, day).assign(Field::Month, month);
            match number(caps, "year") {
                Some(year) => {
                    let year = most_likely_year(year);
                    NaiveDate::from_ymd_opt(year, month as u32, day as u32)?;
                    components.assign(Field::Year, year);
                }
                None => {
                    NaiveDate::from_ymd_opt(2000, month as u32, day as u32)?;
                    let year = closest_year(reference.date(), month as u32, day as u32);
                    components.imply(Field::Year, year);
                }
            }
            Some(ParsingResult::new(whole.start(), whole.as_str(), components))
        })
    }
}

/// Not glued to more numbers: "1/10/8/2012" holds no date.
fn stands_alone(text: &str, start: usize, end: usize) -> bool {
    let is_separator = |c: char| matches!(c, '/' | '.' | '-');

    let mut before = text[..start].chars().rev();
    let glued_before = matches!(
        (before.next(), before.next()),
        (Some(sep), Some(digit)) if is_separator(sep) && digit.is_ascii_digit()
    );
    let mut after = text[end..].chars();
    let glued_after = matches!(
        (after.next(), after.next()),
        (Some(sep), Some(digit)) if is_separator(sep) && digit.is_ascii_digit()
    );
    !glued_before && !glued_after
}

fn number(caps: &Captures<'_>, name: &str) -> Option<i32> {
    caps.name(name)?.as_str().parse().ok()
}
