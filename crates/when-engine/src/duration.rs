//! Duration accumulation: "3 dagar, 2 timmar" → `{day: 3, hour: 2}`.
//!
//! [`DurationPattern`] consumes `{quantity}{unit}` fragments from the front
//! of a span until none is left. [`RelativeDuration`] wraps it into an
//! extractor for "om 2 dagar" / "2 dagar sedan" style expressions.

use chrono::Datelike;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::calendar::add_time_units;
use crate::components::{Field, ParsingComponents, ParsingResult};
use crate::error::WhenError;
use crate::pattern::{compile, match_any_pattern, scan, strip_captures, Dictionary, Numerals, WordTable};
use crate::reference::ReferenceInstant;

/// The canonical units every surface spelling normalizes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Length in milliseconds, for units with a fixed length.
    pub fn fixed_millis(self) -> Option<i64> {
        match self {
            TimeUnit::Second => Some(1_000),
            TimeUnit::Minute => Some(60_000),
            TimeUnit::Hour => Some(3_600_000),
            TimeUnit::Day => Some(86_400_000),
            TimeUnit::Week => Some(604_800_000),
            TimeUnit::Month | TimeUnit::Year => None,
        }
    }

    pub fn is_sub_day(self) -> bool {
        matches!(self, TimeUnit::Second | TimeUnit::Minute | TimeUnit::Hour)
    }

    pub fn name(self) -> &'static str {
        match self {
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
        }
    }
}

/// Ordered unit → magnitude mapping.
///
/// Setting a unit that is already present replaces its magnitude in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeUnits {
    entries: Vec<(TimeUnit, f64)>,
}

impl TimeUnits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, unit: TimeUnit, amount: f64) {
        match self.entries.iter_mut().find(|(u, _)| *u == unit) {
            Some(entry) => entry.1 = amount,
            None => self.entries.push((unit, amount)),
        }
    }

    pub fn get(&self, unit: TimeUnit) -> Option<f64> {
        self.entries
            .iter()
            .find(|(u, _)| *u == unit)
            .map(|(_, amount)| *amount)
    }

    pub fn contains(&self, unit: TimeUnit) -> bool {
        self.get(unit).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimeUnit, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_sub_day(&self) -> bool {
        self.entries.iter().any(|(u, _)| u.is_sub_day())
    }

    /// The same mapping pointing the other way in time.
    pub fn negated(&self) -> Self {
        Self {
            entries: self.entries.iter().map(|(u, a)| (*u, -a)).collect(),
        }
    }
}

impl Serialize for TimeUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (unit, amount) in &self.entries {
            map.serialize_entry(unit.name(), amount)?;
        }
        map.end()
    }
}

/// Compiled `{quantity}{unit}` fragment patterns for one locale.
#[derive(Debug, Clone)]
pub struct DurationPattern {
    numerals: Numerals,
    units: WordTable<TimeUnit>,
    fragment: Regex,
    intensity: Option<Regex>,
    pattern: String,
}

impl DurationPattern {
    /// `intensity_words` ("about", "cirka", ...) may precede the first fragment.
    pub fn new(
        numerals: &Numerals,
        units: Dictionary<TimeUnit>,
        intensity_words: &[&str],
    ) -> Result<Self, WhenError> {
        let units = WordTable::new(units);
        let single = format!(
            r"(?P<amount>{})\s*(?P<unit>{})\b",
            numerals.pattern(),
            units.pattern()
        );
        let fragment = compile("duration fragment", &format!(r"^\s*,?\s*{single}"))?;

        let intensity_alt = (!intensity_words.is_empty())
            .then(|| match_any_pattern(intensity_words.iter().copied()));
        let intensity = intensity_alt
            .as_ref()
            .map(|alt| compile("duration intensity", &format!(r"^\s*{alt}\s*")))
            .transpose()?;

        let single_nc = strip_captures(&single);
        let lead = intensity_alt
            .map(|alt| format!(r"(?:{alt}\s*)?"))
            .unwrap_or_default();
        let pattern = format!(r"{lead}{single_nc}(?:\s*,?\s*{single_nc})*");

        Ok(Self {
            numerals: numerals.clone(),
            units,
            fragment,
            intensity,
            pattern,
        })
    }

    /// Non-capturing pattern matching a whole run of fragments.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Collect every fragment at the front of `text`.
    ///
    /// Stops at the first position where no fragment matches; returns an
    /// empty mapping when there is none at all. A unit seen twice keeps its
    /// later magnitude.
    pub fn accumulate(&self, text: &str) -> TimeUnits {
        let mut remaining = text;
        if let Some(m) = self.intensity.as_ref().and_then(|re| re.find(remaining)) {
            remaining = &remaining[m.end()..];
        }

        let mut units = TimeUnits::new();
        while let Some(caps) = self.fragment.captures(remaining) {
            let Some(whole) = caps.get(0) else { break };
            let amount = caps.name("amount").and_then(|m| self.numerals.parse(m.as_str()));
            let unit = caps.name("unit").and_then(|m| self.units.get(m.as_str()));
            if let (Some(amount), Some(unit)) = (amount, unit) {
                units.set(unit, amount);
            }
            if whole.is_empty() {
                break;
            }
            remaining = &remaining[whole.end()..];
        }
        units
    }
}

/// Surface words around a duration that point it into the future or past.
#[derive(Debug, Clone, Copy)]
pub struct RelativeDurationWords {
    /// Before a future duration ("om", "inom").
    pub future_prefix: &'static str,
    /// Optional lead-in before a past duration ("för").
    pub past_prefix: &'static str,
    /// After a past duration ("sedan").
    pub past_suffix: &'static str,
}

/// Extractor for durations relative to the reference instant.
#[derive(Debug, Clone)]
pub struct RelativeDuration {
    duration: DurationPattern,
    regex: Regex,
}

impl RelativeDuration {
    pub fn new(duration: DurationPattern, words: &RelativeDurationWords) -> Result<Self, WhenError> {
        let dur = duration.pattern();
        let pattern = format!(
            r"(?:{future}\s*(?P<future>{dur}))|(?:(?:{past_prefix})\s*)?(?P<past>{dur})\s*{past_suffix}",
            future = words.future_prefix,
            past_prefix = words.past_prefix,
            past_suffix = words.past_suffix,
        );
        let regex = compile("relative duration", &pattern)?;
        Ok(Self { duration, regex })
    }

    pub fn try_match(
        &self,
        text: &str,
        offset: usize,
        reference: &ReferenceInstant,
    ) -> Option<ParsingResult> {
        scan(&self.regex, text, offset, |caps| {
            let whole = caps.get(0)?;
            let (span, past) = match caps.name("future") {
                Some(m) => (m, false),
                None => (caps.name("past")?, true),
            };
            let units = self.duration.accumulate(span.as_str());
            if units.is_empty() {
                return None;
            }
            let units = if past { units.negated() } else { units };
            let components = components_from_units(reference, &units)?;
            Some(ParsingResult::new(whole.start(), whole.as_str(), components))
        })
    }
}

/// Components for the reference instant shifted by `units`.
///
/// Sub-day units pin the full date and time as certain. Coarser units only
/// assign the fields they name and imply the rest.
pub fn components_from_units(
    reference: &ReferenceInstant,
    units: &TimeUnits,
) -> Option<ParsingComponents> {
    let target = add_time_units(reference.local_datetime(), units)?;
    let offset = reference.timezone_offset_minutes();
    let mut components = ParsingComponents::new();

    if units.has_sub_day() {
        components
            .assign_time(target.time())
            .assign_date(target.date())
            .assign(Field::TimezoneOffset, offset);
        return Some(components);
    }

    components.imply_time(target.time()).imply(Field::TimezoneOffset, offset);
    let date = target.date();
    if units.contains(TimeUnit::Day) || units.contains(TimeUnit::Week) {
        components.assign_date(date);
    } else if units.contains(TimeUnit::Month) {
        components
            .assign(Field::Month, date.month() as i32)
            .assign(Field::Year, date.year())
            .imply(Field::Day, date.day() as i32);
    } else {
        components.assign(Field::Year, date.year());
        components.imply_date(date);
    }
    Some(components)
}
