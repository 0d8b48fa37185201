//! Weekday names resolved to concrete dates: "tisdag", "nästa fredag".

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;

use crate::calendar::{add_days, days_backward_to, days_forward_to, days_from_week_start, WeekStartDay};
use crate::components::{Field, ParsingComponents, ParsingResult};
use crate::error::WhenError;
use crate::pattern::{compile, scan, Dictionary, WordTable};
use crate::reference::ReferenceInstant;

/// Which occurrence of a weekday is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayModifier {
    This,
    Next,
    Last,
}

/// Signed day distance from `reference` to the meant `weekday`.
///
/// Without a modifier the closest occurrence wins, today included; ties
/// between a forward and a backward occurrence go backward.
pub fn days_to_weekday(reference: NaiveDate, weekday: Weekday, modifier: Option<WeekdayModifier>) -> i64 {
    match modifier {
        Some(WeekdayModifier::This) => days_forward_to(reference, weekday),
        Some(WeekdayModifier::Last) => days_backward_to(reference, weekday),
        Some(WeekdayModifier::Next) => days_to_next(reference, weekday),
        None => {
            let forward = days_forward_to(reference, weekday);
            let backward = days_backward_to(reference, weekday);
            if forward < -backward {
                forward
            } else {
                backward
            }
        }
    }
}

/// "Next X" is X of the following week.
fn days_to_next(reference: NaiveDate, weekday: Weekday) -> i64 {
    let target = weekday.num_days_from_sunday() as i64;
    match reference.weekday() {
        Weekday::Sun => {
            if weekday == Weekday::Sun {
                7
            } else {
                target
            }
        }
        Weekday::Sat => match weekday {
            Weekday::Sat => 7,
            Weekday::Sun => 8,
            _ => 1 + target,
        },
        today => {
            let forward = days_forward_to(reference, weekday);
            if target < today.num_days_from_sunday() as i64 && weekday != Weekday::Sun {
                forward
            } else {
                forward + 7
            }
        }
    }
}

/// Components for the meant weekday: certain date plus certain weekday index.
pub fn resolve_weekday(
    reference: NaiveDate,
    weekday: Weekday,
    modifier: Option<WeekdayModifier>,
    week_start: WeekStartDay,
) -> Option<ParsingComponents> {
    let date = add_days(reference, days_to_weekday(reference, weekday, modifier))?;
    let mut components = ParsingComponents::new();
    components
        .assign_date(date)
        .assign(Field::Weekday, days_from_week_start(weekday, week_start) as i32);
    Some(components)
}

/// Extractor for a weekday name with an optional modifier word.
#[derive(Debug, Clone)]
pub struct WeekdayExpression {
    regex: Regex,
    weekdays: WordTable<Weekday>,
    modifiers: WordTable<WeekdayModifier>,
    week_start: WeekStartDay,
}

impl WeekdayExpression {
    pub fn new(
        weekdays: &[(&str, Weekday)],
        modifiers: Dictionary<WeekdayModifier>,
        week_start: WeekStartDay,
    ) -> Result<Self, WhenError> {
        let weekdays = WordTable::new(weekdays);
        let modifiers = WordTable::new(modifiers);
        let pattern = format!(
            r"(?:(?P<modifier>{})\s*)?(?P<weekday>{})",
            modifiers.pattern(),
            weekdays.pattern()
        );
        Ok(Self {
            regex: compile("weekday", &pattern)?,
            weekdays,
            modifiers,
            week_start,
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
            let weekday = self.weekdays.get(caps.name("weekday")?.as_str())?;
            let modifier = match caps.name("modifier") {
                Some(m) => Some(self.modifiers.get(m.as_str())?),
                None => None,
            };
            let components = resolve_weekday(reference.date(), weekday, modifier, self.week_start)?;
            Some(ParsingResult::new(whole.start(), whole.as_str(), components))
        })
    }
}
