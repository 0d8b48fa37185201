//! Explicit date and time literals: "10 augusti 2012", "kl 8:30", "10 - 22 augusti".
//!
//! A [`PrimaryExpression`] is built from four locale fragments:
//!
//! ```text
//! {prefix}{literal}({connector}{literal})?{suffix}
//! ```
//!
//! The literal names what it captures through the groups `weekday`, `day`,
//! `month`, `year`, `hour`, `minute`, `second`, `millisecond` and `meridiem`.
//! Every group that matched becomes a certain field. The second literal, when
//! the connector matched, becomes the result's `end`.
//!
//! A prefix may carry an `anchor` group ("kl", "klockan"): when it matches,
//! the expression is accepted even without any of its anchor fields.

use chrono::{NaiveDate, Weekday};
use regex::{Captures, Regex};
use tracing::trace;

use crate::calendar::{closest_year, days_from_week_start, WeekStartDay};
use crate::components::{Field, Meridiem, ParsingComponents, ParsingResult};
use crate::error::WhenError;
use crate::pattern::{compile, ends_at_boundary, scan, Dictionary, Numerals, WordTable};
use crate::reference::ReferenceInstant;
use crate::refiners::backfill_range;
use crate::year::EraMarkers;

const END_PREFIX: &str = "end_";

/// The word tables a literal's capture groups are read through.
#[derive(Debug, Clone)]
pub struct LiteralVocabulary {
    pub weekdays: WordTable<Weekday>,
    pub months: WordTable<u32>,
    pub meridiems: WordTable<Meridiem>,
    pub numerals: Numerals,
    pub era: EraMarkers,
    pub week_start: WeekStartDay,
}

/// Locale fragments for one primary expression.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryPattern<'a> {
    pub name: &'static str,
    pub prefix: &'a str,
    pub literal: &'a str,
    pub connector: Option<&'a str>,
    pub suffix: &'a str,
    /// At least one of these must be certain for a match to count.
    pub anchors: &'static [Field],
    /// Part-of-day stems looked up in the prefix and suffix text.
    pub day_periods: Dictionary<Meridiem>,
}

#[derive(Debug, Clone)]
pub struct PrimaryExpression {
    name: &'static str,
    regex: Regex,
    anchors: &'static [Field],
    day_periods: Dictionary<Meridiem>,
    vocabulary: LiteralVocabulary,
}

impl PrimaryExpression {
    pub fn new(pattern: PrimaryPattern<'_>, vocabulary: &LiteralVocabulary) -> Result<Self, WhenError> {
        let range = pattern
            .connector
            .map(|connector| {
                let end_literal = pattern.literal.replace("(?P<", &format!("(?P<{END_PREFIX}"));
                format!("(?:{connector}(?P<end>{end_literal}))?")
            })
            .unwrap_or_default();
        let full = format!(
            "(?P<prefix>{})(?:{}){}(?P<suffix>{})",
            pattern.prefix, pattern.literal, range, pattern.suffix
        );

        Ok(Self {
            name: pattern.name,
            regex: compile(pattern.name, &full)?,
            anchors: pattern.anchors,
            day_periods: pattern.day_periods,
            vocabulary: vocabulary.clone(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn try_match(
        &self,
        text: &str,
        offset: usize,
        reference: &ReferenceInstant,
    ) -> Option<ParsingResult> {
        scan(&self.regex, text, offset, |caps| {
            let start = caps.get(0)?.start();
            let Some(cut) = year_overrun(text, caps) else {
                return self.extract(caps, reference);
            };

            // Retry with the year excluded, so "10 augusti 14:30" stays a date.
            trace!(expression = self.name, cut, "year runs into following digits, retrying");
            let retried = self.regex.captures_at(&text[..cut], start)?;
            let whole = retried.get(0)?;
            if whole.start() != start
                || !ends_at_boundary(text, whole.end())
                || year_overrun(text, &retried).is_some()
            {
                return None;
            }
            self.extract(&retried, reference)
        })
    }

    fn extract(&self, caps: &Captures<'_>, reference: &ReferenceInstant) -> Option<ParsingResult> {
        let whole = caps.get(0)?;
        let mut start = self.read_literal(caps, "")?;
        let mut end = match caps.name("end") {
            Some(_) => Some(self.read_literal(caps, END_PREFIX)?),
            None => None,
        };

        if let Some(meridiem) = self.day_period(caps) {
            apply_day_period(&mut start, meridiem);
            if let Some(end) = end.as_mut() {
                apply_day_period(end, meridiem);
            }
        }

        let anchored = caps.name("anchor").is_some_and(|m| !m.as_str().is_empty())
            || self.anchors.iter().any(|field| {
                start.is_certain(*field) || end.as_ref().is_some_and(|e| e.is_certain(*field))
            });
        if !anchored {
            return None;
        }

        if let Some(end) = end.as_mut() {
            backfill_range(&mut start, end);
            imply_closest_year(end, reference);
        }
        imply_closest_year(&mut start, reference);

        let result = ParsingResult::new(whole.start(), whole.as_str(), start);
        Some(match end {
            Some(end) => result.with_end(end),
            None => result,
        })
    }

    /// Read one literal's groups (named with `prefix`) into certain fields.
    ///
    /// Returns `None` for out-of-range values.
    fn read_literal(&self, caps: &Captures<'_>, prefix: &str) -> Option<ParsingComponents> {
        let group = |name: &str| caps.name(&format!("{prefix}{name}")).map(|m| m.as_str());
        let vocabulary = &self.vocabulary;
        let mut components = ParsingComponents::new();

        if let Some(word) = group("weekday") {
            let weekday = vocabulary.weekdays.get(word)?;
            let index = days_from_week_start(weekday, vocabulary.week_start);
            components.assign(Field::Weekday, index as i32);
        }

        let day = optional(group("day"), |token| {
            vocabulary
                .numerals
                .parse_integer(token.trim_end_matches('.'))
                .filter(|d| (1..=31).contains(d))
        })?;
        let month = optional(group("month"), |token| {
            vocabulary
                .months
                .get(token)
                .map(|m| m as i32)
                .or_else(|| token.parse().ok())
                .filter(|m| (1..=12).contains(m))
        })?;
        let year = optional(group("year"), |token| vocabulary.era.resolve(token))?;

        if let (Some(day), Some(month)) = (day, month) {
            // A year-less date only has to exist in some year (2000 is a leap year).
            NaiveDate::from_ymd_opt(year.unwrap_or(2000), month as u32, day as u32)?;
        }
        if let Some(day) = day {
            components.assign(Field::Day, day);
        }
        if let Some(month) = month {
            components.assign(Field::Month, month);
        }
        if let Some(year) = year {
            components.assign(Field::Year, year);
        }

        let Some(hour) = group("hour") else {
            return Some(components);
        };
        let mut hour: i32 = hour.parse().ok().filter(|h| (0..=24).contains(h))?;
        if let Some(minute) = group("minute") {
            let minute: i32 = minute.parse().ok().filter(|m| (0..=59).contains(m))?;
            components.assign(Field::Minute, minute);
        }
        if let Some(second) = group("second") {
            let second: i32 = second.parse().ok().filter(|s| (0..=59).contains(s))?;
            components.assign(Field::Second, second);
        }
        if let Some(fraction) = group("millisecond") {
            components.assign(Field::Millisecond, fraction_to_millis(fraction)?);
        }

        match group("meridiem").and_then(|marker| vocabulary.meridiems.get(marker)) {
            Some(marker) if (1..=12).contains(&hour) => {
                hour = match (marker, hour) {
                    (Meridiem::Am, 12) => 0,
                    (Meridiem::Pm, h) if h < 12 => h + 12,
                    (_, h) => h,
                };
                components.assign(Field::Meridiem, marker.value());
            }
            Some(_) => {
                components.assign(Field::Meridiem, Meridiem::of_hour(hour as u32).value());
            }
            None => {
                components.imply(Field::Meridiem, Meridiem::of_hour(hour as u32).value());
            }
        }
        components.assign(Field::Hour, hour);
        Some(components)
    }

    fn day_period(&self, caps: &Captures<'_>) -> Option<Meridiem> {
        ["prefix", "suffix"]
            .iter()
            .filter_map(|name| caps.name(name))
            .map(|m| m.as_str().to_lowercase())
            .find_map(|around| {
                self.day_periods
                    .iter()
                    .find(|(stem, _)| around.contains(stem))
                    .map(|(_, meridiem)| *meridiem)
            })
    }
}

/// An absent group reads as `Some(None)`; a present one that `read` rejects
/// as `None`.
fn optional<T>(token: Option<&str>, read: impl FnOnce(&str) -> Option<T>) -> Option<Option<T>> {
    match token {
        None => Some(None),
        Some(token) => read(token).map(Some),
    }
}

/// Byte offset of a year group that runs into "non-space, digit".
fn year_overrun(text: &str, caps: &Captures<'_>) -> Option<usize> {
    ["year", "end_year"]
        .iter()
        .filter_map(|name| caps.name(name))
        .find(|m| {
            let mut rest = text[m.end()..].chars();
            matches!(
                (rest.next(), rest.next()),
                (Some(c), Some(d)) if !c.is_whitespace() && d.is_ascii_digit()
            )
        })
        .map(|m| m.start())
}

/// Shift a 1–11 hour into the given half of the day, unless an explicit
/// marker already fixed the meridiem.
fn apply_day_period(components: &mut ParsingComponents, meridiem: Meridiem) {
    if components.is_certain(Field::Meridiem) {
        return;
    }
    let Some(hour) = components.get(Field::Hour) else {
        return;
    };
    if !(1..=11).contains(&hour) {
        return;
    }
    if meridiem == Meridiem::Pm {
        components.assign(Field::Hour, hour + 12);
    }
    components.assign(Field::Meridiem, meridiem.value());
}

fn imply_closest_year(components: &mut ParsingComponents, reference: &ReferenceInstant) {
    if components.contains(Field::Year) {
        return;
    }
    let (Some(month), Some(day)) = (components.get(Field::Month), components.get(Field::Day)) else {
        return;
    };
    let year = closest_year(reference.date(), month as u32, day as u32);
    components.imply(Field::Year, year);
}

/// "5" → 500, "25" → 250, "1234" → 123.
pub(crate) fn fraction_to_millis(fraction: &str) -> Option<i32> {
    let digits: String = fraction.chars().chain("00".chars()).take(3).collect();
    digits.parse().ok()
}
