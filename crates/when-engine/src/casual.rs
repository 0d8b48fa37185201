//! Casual keywords: "idag", "imorgon kväll", "i eftermiddag", "midnatt".

use regex::Regex;

use crate::calendar::add_days;
use crate::components::{is_date_field, is_time_of_day, Field, Meridiem, ParsingComponents, ParsingResult};
use crate::error::WhenError;
use crate::pattern::{compile, match_any_pattern, scan, Dictionary, WordTable};
use crate::reference::ReferenceInstant;

/// A day named relative to the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Now,
    Today,
    Tomorrow,
    DayAfterTomorrow,
    Yesterday,
    DayBeforeYesterday,
    LastNight,
}

impl RelativeDay {
    /// Date fields for this day, and whether the reference time of day
    /// should be implied afterwards.
    fn components(self, reference: &ReferenceInstant) -> Option<(ParsingComponents, bool)> {
        let today = reference.date();
        let mut components = ParsingComponents::new();
        let offset = match self {
            RelativeDay::Now => {
                components
                    .assign_date(today)
                    .assign_time(reference.time())
                    .assign(Field::TimezoneOffset, reference.timezone_offset_minutes());
                return Some((components, false));
            }
            RelativeDay::LastNight => {
                let offset = if reference.hour() > 6 { -1 } else { 0 };
                components.assign_date(add_days(today, offset)?).imply(Field::Hour, 0);
                return Some((components, false));
            }
            RelativeDay::Today => 0,
            RelativeDay::Tomorrow => 1,
            RelativeDay::DayAfterTomorrow => 2,
            RelativeDay::Yesterday => -1,
            RelativeDay::DayBeforeYesterday => -2,
        };
        components.assign_date(add_days(today, offset)?);
        Some((components, true))
    }
}

/// A named part of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfDay {
    Morning,
    Forenoon,
    Noon,
    Afternoon,
    Evening,
    LateEvening,
    Night,
    Midnight,
}

impl PartOfDay {
    fn hour(self) -> Option<(i32, Meridiem)> {
        match self {
            PartOfDay::Morning => Some((6, Meridiem::Am)),
            PartOfDay::Forenoon => Some((9, Meridiem::Am)),
            PartOfDay::Noon => Some((12, Meridiem::Am)),
            PartOfDay::Afternoon => Some((15, Meridiem::Pm)),
            PartOfDay::Evening => Some((18, Meridiem::Pm)),
            PartOfDay::LateEvening | PartOfDay::Night => Some((22, Meridiem::Pm)),
            PartOfDay::Midnight => None,
        }
    }

    /// Imply this part of day's time onto `components`.
    ///
    /// Midnight after 01:00 means the start of the following day: the
    /// implied time of day is dropped and, unless a date was read from the
    /// text, the next day is implied.
    pub fn apply(self, components: ParsingComponents, reference: &ReferenceInstant) -> ParsingComponents {
        let (hour, meridiem, mut components) = match self.hour() {
            Some((hour, meridiem)) => (hour, meridiem, components),
            None => (0, Meridiem::Am, roll_past_midnight(components, reference)),
        };
        components
            .imply(Field::Hour, hour)
            .imply(Field::Minute, 0)
            .imply(Field::Second, 0)
            .imply(Field::Meridiem, meridiem.value());
        components
    }
}

fn roll_past_midnight(components: ParsingComponents, reference: &ReferenceInstant) -> ParsingComponents {
    if !components.get(Field::Hour).is_some_and(|hour| hour > 1) {
        return components;
    }
    if components.has_certain_date() {
        return components.without_implied_time();
    }

    let base = components.date().unwrap_or_else(|| reference.date());
    let mut next = components.without_implied(|field| is_time_of_day(field) || is_date_field(field));
    if let Some(day) = add_days(base, 1) {
        next.imply_date(day);
    }
    next
}

/// Imply a part of day and the reference time in the order that lets the
/// keyword win.
fn imply_time_of_day(
    components: ParsingComponents,
    part: Option<PartOfDay>,
    reference: &ReferenceInstant,
    with_reference_time: bool,
) -> ParsingComponents {
    let mut components = components;
    match part {
        // Midnight looks at the hour it is rolling past.
        Some(PartOfDay::Midnight) => {
            if with_reference_time {
                components.imply_time(reference.time());
            }
            PartOfDay::Midnight.apply(components, reference)
        }
        Some(part) => {
            let mut components = part.apply(components, reference);
            if with_reference_time {
                components.imply_time(reference.time());
            }
            components
        }
        None => {
            if with_reference_time {
                components.imply_time(reference.time());
            }
            components
        }
    }
}

/// Relative day, optionally followed by a part of day ("imorgon kväll").
#[derive(Debug, Clone)]
pub struct CasualDate {
    regex: Regex,
    days: WordTable<RelativeDay>,
    parts: WordTable<PartOfDay>,
}

impl CasualDate {
    pub fn new(days: Dictionary<RelativeDay>, parts: Dictionary<PartOfDay>) -> Result<Self, WhenError> {
        let days = WordTable::new(days);
        let parts = WordTable::new(parts);
        let pattern = format!(
            r"(?P<day>{})(?:\s*(?:på\s+)?(?P<part>{})(?:en)?)?",
            days.pattern(),
            parts.pattern()
        );
        Ok(Self {
            regex: compile("casual date", &pattern)?,
            days,
            parts,
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
            let day = self.days.get(caps.name("day")?.as_str())?;
            let part = match caps.name("part") {
                Some(m) => Some(self.parts.get(m.as_str())?),
                None => None,
            };
            let (components, with_reference_time) = day.components(reference)?;
            let components = imply_time_of_day(components, part, reference, with_reference_time);
            Some(ParsingResult::new(whole.start(), whole.as_str(), components))
        })
    }
}

/// A standalone part of day ("i kväll", "på eftermiddagen").
#[derive(Debug, Clone)]
pub struct CasualTime {
    regex: Regex,
    parts: WordTable<PartOfDay>,
}

impl CasualTime {
    /// `demonstratives` ("denna", "på") may precede the keyword.
    pub fn new(parts: Dictionary<PartOfDay>, demonstratives: &[&str]) -> Result<Self, WhenError> {
        let parts = WordTable::new(parts);
        let lead = if demonstratives.is_empty() {
            String::new()
        } else {
            format!(r"(?:{}\s*)?", match_any_pattern(demonstratives.iter().copied()))
        };
        let pattern = format!(r"{lead}(?P<part>{})(?:en)?", parts.pattern());
        Ok(Self {
            regex: compile("casual time", &pattern)?,
            parts,
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
            let part = self.parts.get(caps.name("part")?.as_str())?;
            let components = imply_time_of_day(ParsingComponents::new(), Some(part), reference, true);
            Some(ParsingResult::new(whole.start(), whole.as_str(), components))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;

    const DAYS: Dictionary<RelativeDay> = &[
        ("nu", RelativeDay::Now),
        ("idag", RelativeDay::Today),
        ("imorgon", RelativeDay::Tomorrow),
        ("i morgon", RelativeDay::Tomorrow),
        ("övermorgon", RelativeDay::DayAfterTomorrow),
        ("igår", RelativeDay::Yesterday),
        ("förrgår", RelativeDay::DayBeforeYesterday),
        ("inatt", RelativeDay::LastNight),
    ];

    const PARTS: Dictionary<PartOfDay> = &[
        ("morgon", PartOfDay::Morning),
        ("förmiddag", PartOfDay::Forenoon),
        ("lunch", PartOfDay::Noon),
        ("eftermiddag", PartOfDay::Afternoon),
        ("kväll", PartOfDay::Evening),
        ("sen kväll", PartOfDay::LateEvening),
        ("natt", PartOfDay::Night),
        ("midnatt", PartOfDay::Midnight),
    ];

    fn anchor() -> ReferenceInstant {
        // Friday, August 10, 2012, 12:34 UTC
        ReferenceInstant::utc(Utc.with_ymd_and_hms(2012, 8, 10, 12, 34, 0).unwrap())
    }

    fn early_anchor() -> ReferenceInstant {
        ReferenceInstant::utc(Utc.with_ymd_and_hms(2012, 8, 10, 4, 0, 0).unwrap())
    }

    fn casual_date() -> CasualDate {
        CasualDate::new(DAYS, PARTS).unwrap()
    }

    fn casual_time() -> CasualTime {
        CasualTime::new(PARTS, &["denna", "den här", "på", "i"]).unwrap()
    }

    fn date_of(c: &ParsingComponents) -> NaiveDate {
        c.date().unwrap()
    }

    #[test]
    fn test_today_implies_reference_time() {
        let result = casual_date().try_match("idag", 0, &anchor()).unwrap();
        assert_eq!(date_of(&result.start), NaiveDate::from_ymd_opt(2012, 8, 10).unwrap());
        assert!(result.start.is_certain(Field::Day));
        assert_eq!(result.start.get(Field::Hour), Some(12));
        assert_eq!(result.start.get(Field::Minute), Some(34));
        assert!(!result.start.is_certain(Field::Hour));
    }

    #[test]
    fn test_now_is_certain() {
        let result = casual_date().try_match("nu", 0, &anchor()).unwrap();
        assert!(result.start.is_certain(Field::Hour));
        assert!(result.start.is_certain(Field::Minute));
        assert!(result.start.is_certain(Field::TimezoneOffset));
    }

    #[test]
    fn test_day_offsets() {
        let cases = [
            ("imorgon", 11),
            ("övermorgon", 12),
            ("igår", 9),
            ("förrgår", 8),
        ];
        for (text, day) in cases {
            let result = casual_date().try_match(text, 0, &anchor()).unwrap();
            assert_eq!(result.start.get(Field::Day), Some(day), "{text}");
            assert!(result.start.is_certain(Field::Day), "{text}");
        }
    }

    #[test]
    fn test_tomorrow_evening_keyword_beats_reference_time() {
        let result = casual_date().try_match("imorgon kväll", 0, &anchor()).unwrap();
        assert_eq!(result.text, "imorgon kväll");
        assert_eq!(result.start.get(Field::Day), Some(11));
        assert_eq!(result.start.get(Field::Hour), Some(18));
        assert_eq!(result.start.get(Field::Minute), Some(0));
        assert_eq!(result.start.meridiem(), Some(Meridiem::Pm));
    }

    #[test]
    fn test_last_night_depends_on_reference_hour() {
        let late = casual_date().try_match("inatt", 0, &anchor()).unwrap();
        assert_eq!(late.start.get(Field::Day), Some(9));
        assert_eq!(late.start.get(Field::Hour), Some(0));

        let early = casual_date().try_match("inatt", 0, &early_anchor()).unwrap();
        assert_eq!(early.start.get(Field::Day), Some(10));
    }

    #[test]
    fn test_casual_time_keywords() {
        let cases = [
            ("denna morgon", 6, Meridiem::Am),
            ("på förmiddagen", 9, Meridiem::Am),
            ("lunch", 12, Meridiem::Am),
            ("i eftermiddag", 15, Meridiem::Pm),
            ("i kväll", 18, Meridiem::Pm),
            ("sen kväll", 22, Meridiem::Pm),
            ("natten", 22, Meridiem::Pm),
        ];
        for (text, hour, meridiem) in cases {
            let result = casual_time().try_match(text, 0, &anchor()).unwrap();
            assert_eq!(result.text, text);
            assert_eq!(result.start.get(Field::Hour), Some(hour), "{text}");
            assert_eq!(result.start.meridiem(), Some(meridiem), "{text}");
            assert!(!result.start.is_certain(Field::Hour), "{text}");
        }
    }

    #[test]
    fn test_standalone_midnight_rolls_to_next_day() {
        let result = casual_time().try_match("midnatt", 0, &anchor()).unwrap();
        assert_eq!(result.start.get(Field::Hour), Some(0));
        assert_eq!(result.start.get(Field::Minute), Some(0));
        assert_eq!(date_of(&result.start), NaiveDate::from_ymd_opt(2012, 8, 11).unwrap());
        assert!(!result.start.is_certain(Field::Day));
    }

    #[test]
    fn test_midnight_before_one_does_not_roll() {
        let reference = ReferenceInstant::utc(Utc.with_ymd_and_hms(2012, 8, 10, 0, 30, 0).unwrap());
        let result = casual_time().try_match("midnatt", 0, &reference).unwrap();
        assert_eq!(result.start.get(Field::Hour), Some(0));
        assert_eq!(result.start.get(Field::Day), None);
    }

    #[test]
    fn test_midnight_keeps_certain_date() {
        let result = casual_date().try_match("imorgon midnatt", 0, &anchor()).unwrap();
        assert_eq!(result.start.get(Field::Day), Some(11));
        assert!(result.start.is_certain(Field::Day));
        assert_eq!(result.start.get(Field::Hour), Some(0));
    }

    #[test]
    fn test_midnight_rolls_past_implied_hour() {
        let mut components = ParsingComponents::new();
        components
            .imply_date(NaiveDate::from_ymd_opt(2012, 12, 31).unwrap())
            .imply(Field::Hour, 13);
        let rolled = PartOfDay::Midnight.apply(components, &anchor());
        assert_eq!(date_of(&rolled), NaiveDate::from_ymd_opt(2013, 1, 1).unwrap());
        assert_eq!(rolled.get(Field::Hour), Some(0));
        assert!(!rolled.is_certain(Field::Hour));
    }

    #[test]
    fn test_unset_hour_does_not_roll() {
        let rolled = PartOfDay::Midnight.apply(ParsingComponents::new(), &anchor());
        assert_eq!(rolled.get(Field::Day), None);
        assert_eq!(rolled.get(Field::Hour), Some(0));
        assert_eq!(rolled.meridiem(), Some(Meridiem::Am));
    }

    #[test]
    fn test_keyword_inside_word_is_ignored() {
        assert!(casual_time().try_match("eftermiddagsfika", 0, &anchor()).is_none());
    }

    proptest! {
        /// An implied hour past 01:00 always moves midnight to the next day.
        #[test]
        fn test_midnight_rollover(hour in 0i32..24, day in 1u32..28) {
            let date = NaiveDate::from_ymd_opt(2012, 8, day).unwrap();
            let mut components = ParsingComponents::new();
            components.imply_date(date).imply(Field::Hour, hour);
            let rolled = PartOfDay::Midnight.apply(components, &anchor());

            let expected = if hour > 1 { date.succ_opt().unwrap() } else { date };
            prop_assert_eq!(rolled.date(), Some(expected));
            prop_assert_eq!(rolled.get(Field::Minute), Some(0));
        }
    }
}
